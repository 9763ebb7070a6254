use std::str::FromStr;
use super::ValidationError;

#[derive(
    Debug, Copy, Clone, Default,
    PartialEq, Eq, Hash,
    strum_macros::Display, strum_macros::EnumString, strum_macros::EnumIter, strum_macros::AsRefStr,
    serde::Serialize, serde::Deserialize,
    sqlx::Type
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "notice_level", rename_all = "lowercase")]
pub enum NoticeLevel {
    #[default]
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Self::from_str(value)
            .map_err(|_| ValidationError::message(format!("invalid level '{value}', expected one of: info, warning, error")))
    }
}
