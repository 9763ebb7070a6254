mod gotrue;

use async_trait::async_trait;
use reqwest::Url;
use crate::domain::{AuthUser, Email, Password, Session};

pub use gotrue::GoTrueClient;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum AuthError {
    /// The auth service understood the request and refused it.
    #[display("{_0}")]
    Rejected(#[error(not(source))] String),
    #[display("the auth service is unavailable: {_0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for AuthError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq,
    strum_macros::Display, strum_macros::EnumString, strum_macros::AsRefStr,
    serde::Serialize, serde::Deserialize
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OtpType {
    Signup,
    Invite,
    Magiclink,
    Recovery,
    EmailChange,
    Email,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// `None` when the token is missing, expired or otherwise rejected.
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError>;

    async fn sign_up(&self, email: &Email, password: &Password, redirect_to: &Url) -> Result<AuthUser, AuthError>;

    async fn sign_in_with_password(&self, email: &Email, password: &Password) -> Result<Session, AuthError>;

    async fn reset_password_for_email(&self, email: &Email, redirect_to: &Url) -> Result<(), AuthError>;

    async fn update_password(&self, access_token: &str, password: &Password) -> Result<AuthUser, AuthError>;

    async fn verify_otp(&self, token_hash: &str, otp_type: OtpType) -> Result<Session, AuthError>;
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use async_trait::async_trait;
    use reqwest::Url;
    use uuid::Uuid;
    use crate::domain::{AuthUser, Email, Password, Session, UserId};
    use super::{AuthError, AuthProvider, OtpType};

    /// Keeps users in memory; the access token of a user is its id.
    #[derive(Default)]
    pub struct FakeAuth {
        users: Mutex<HashMap<String, (AuthUser, String)>>,
    }

    impl FakeAuth {
        pub fn with_user(email: &str, password: &str) -> (Self, AuthUser) {
            let auth = Self::default();
            let user = auth.insert(email, password);
            (auth, user)
        }

        fn insert(&self, email: &str, password: &str) -> AuthUser {
            let user = AuthUser {
                id: UserId::new(Uuid::new_v4()),
                email: Some(email.to_owned()),
                new_email: None,
            };
            self.users.lock().unwrap()
                .insert(email.to_owned(), (user.clone(), password.to_owned()));
            user
        }

        fn session(user: AuthUser) -> Session {
            Session {
                access_token: user.id.to_string(),
                token_type: "bearer".to_owned(),
                expires_in: 3600,
                refresh_token: "refresh".to_owned(),
                user,
            }
        }

        fn find_by_token(&self, token: &str) -> Option<AuthUser> {
            self.users.lock().unwrap()
                .values()
                .find(|(user, _)| user.id.to_string() == token)
                .map(|(user, _)| user.clone())
        }
    }

    #[async_trait]
    impl AuthProvider for FakeAuth {
        async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
            Ok(self.find_by_token(access_token))
        }

        async fn sign_up(&self, email: &Email, password: &Password, _redirect_to: &Url) -> Result<AuthUser, AuthError> {
            if self.users.lock().unwrap().contains_key(email.value_ref()) {
                return Err(AuthError::Rejected("User already registered".to_owned()))
            }
            Ok(self.insert(email.value_ref(), password.value_ref()))
        }

        async fn sign_in_with_password(&self, email: &Email, password: &Password) -> Result<Session, AuthError> {
            match self.users.lock().unwrap().get(email.value_ref()) {
                Some((user, pwd)) if pwd == password.value_ref() => Ok(Self::session(user.clone())),
                _ => Err(AuthError::Rejected("Invalid login credentials".to_owned()))
            }
        }

        async fn reset_password_for_email(&self, _email: &Email, _redirect_to: &Url) -> Result<(), AuthError> {
            Ok(())
        }

        async fn update_password(&self, access_token: &str, password: &Password) -> Result<AuthUser, AuthError> {
            let user = self.find_by_token(access_token)
                .ok_or_else(|| AuthError::Rejected("invalid JWT".to_owned()))?;
            if let Some(email) = &user.email {
                self.users.lock().unwrap()
                    .insert(email.clone(), (user.clone(), password.value_ref().to_owned()));
            }
            Ok(user)
        }

        async fn verify_otp(&self, token_hash: &str, _otp_type: OtpType) -> Result<Session, AuthError> {
            self.find_by_token(token_hash)
                .map(Self::session)
                .ok_or_else(|| AuthError::Rejected("Token has expired or is invalid".to_owned()))
        }
    }
}
