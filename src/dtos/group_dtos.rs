use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};

static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:[-_][a-z0-9]+)*$").expect("slug pattern is valid"));

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GroupForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 50))]
    pub slug: String,
}

impl GroupForm {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        if !SLUG.is_match(&self.slug) {
            return Err(AppError::Validation(format!(
                "slug '{}' must be lowercase letters, digits, '-' or '_'",
                self.slug
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(slug: &str) -> GroupForm {
        GroupForm {
            title: "Sun".into(),
            slug: slug.into(),
        }
    }

    #[test]
    fn slugs_are_url_safe() {
        assert!(form("sun").check().is_ok());
        assert!(form("night-sky_2").check().is_ok());
        assert!(form("Sun").check().is_err());
        assert!(form("a b").check().is_err());
        assert!(form("").check().is_err());
    }
}
