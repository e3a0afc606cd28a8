use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}

impl CommentForm {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        if self.text.trim().is_empty() {
            return Err(AppError::Validation("comment text cannot be blank".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_text_bounds() {
        assert!(CommentForm { text: "giant cat".into() }.check().is_ok());
        assert!(CommentForm { text: " ".into() }.check().is_err());
        assert!(CommentForm { text: "x".repeat(2001) }.check().is_err());
    }
}
