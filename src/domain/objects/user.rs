use serde::{Deserialize, Serialize};
use crate::domain::primitives::UserId;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub new_email: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: AuthUser,
}
