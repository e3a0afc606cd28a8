use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::comment::Comment;
use crate::models::post::PostWithAuthor;
use crate::models::user::UserPublic;

static IMAGE_EXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(jpe?g|png|gif|webp|bmp)$").expect("image extension pattern is valid")
});

/// Body of `POST /api/posts` and `PUT .../posts/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, max = 10000))]
    pub text: String,
    #[validate(url)]
    pub image_url: Option<String>,
    /// MIME type reported by the uploader, e.g. `image/png`.
    pub image_content_type: Option<String>,
    /// Group slug.
    pub group: Option<String>,
}

impl PostForm {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        if self.text.trim().is_empty() {
            return Err(AppError::Validation("post text cannot be blank".into()));
        }
        match (&self.image_url, &self.image_content_type) {
            (None, Some(_)) => Err(AppError::Validation(
                "image_content_type given without image_url".into(),
            )),
            (Some(_), Some(ct)) => check_image_mime(ct),
            (Some(url), None) => {
                let path = url.split(['?', '#']).next().unwrap_or_default();
                if IMAGE_EXT.is_match(path) {
                    Ok(())
                } else {
                    Err(AppError::Validation(
                        "image_url does not point to a supported image".into(),
                    ))
                }
            }
            (None, None) => Ok(()),
        }
    }
}

fn check_image_mime(content_type: &str) -> AppResult<()> {
    let parsed: mime::Mime = content_type
        .parse()
        .map_err(|_| AppError::Validation(format!("bad content type '{content_type}'")))?;
    if parsed.type_() == mime::IMAGE {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "'{content_type}' is not an image"
        )))
    }
}

/// `GET .../posts/{id}`: the post, its author and its comments.
#[derive(Debug, Serialize)]
pub struct PostViewOut {
    pub post: PostWithAuthor,
    pub author: UserPublic,
    pub comments: Vec<Comment>,
}
