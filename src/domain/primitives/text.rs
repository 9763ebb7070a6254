use super::validators::has_min_chars;
use super::ValidationError;

pub const MESSAGE_MIN_LENGTH: usize = 3;

#[derive(Debug, Clone, PartialEq, derive_more::Display, sqlx::Type)]
#[sqlx(transparent)]
pub struct NoticeTitle(String);

#[derive(Debug, Clone, PartialEq, derive_more::Display, sqlx::Type)]
#[sqlx(transparent)]
pub struct NoticeMessage(String);

impl NoticeTitle {
    /// Blank titles are treated as absent.
    pub fn optional(value: Option<String>) -> Option<Self> {
        value
            .filter(|title| !title.trim().is_empty())
            .map(Self)
    }

    #[cfg(test)]
    pub fn value_ref(&self) -> &str {
        &self.0
    }
}

impl NoticeMessage {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if has_min_chars(&value, MESSAGE_MIN_LENGTH) {
            Ok(Self(value))
        } else {
            Err(ValidationError::message(format!("message must contain at least {MESSAGE_MIN_LENGTH} characters")))
        }
    }

    #[cfg(test)]
    pub fn value_ref(&self) -> &str {
        &self.0
    }
}
