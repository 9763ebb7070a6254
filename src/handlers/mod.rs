mod admin;
mod board;
mod events;
mod extract;
mod pages;
mod users;

use std::sync::Arc;
use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use derive_more::Display;
use serde_json::json;
use crate::auth::{AuthError, AuthProvider};
use crate::config::AppConfig;
use crate::domain::ValidationError;
use crate::emails::EmailContainer;
use crate::noticeboard::NoticeBoard;
use crate::realtime::RealtimeHub;

pub type HandlerResult<T> = Result<T, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub board: NoticeBoard,
    pub auth: Arc<dyn AuthProvider>,
    pub hub: RealtimeHub,
    pub emails: EmailContainer,
    pub config: AppConfig,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/noticeboard", get(board::list))
        .route("/api/noticeboard/events", get(board::events))
        .route("/api/noticeboard/:id/view", post(board::view))
        .route("/api/noticeboard/:id/close", post(board::close))
        .route("/api/admin/notices", get(admin::list).post(admin::create))
        .route("/api/admin/notices/stats", get(admin::stats))
        .route("/api/admin/notices/events", get(admin::events))
        .route("/api/admin/notices/:id", put(admin::update).delete(admin::delete))
        .route("/api/admin/notices/:id/visibility", put(admin::set_visibility))
        .route("/auth/register", post(users::register))
        .route("/auth/login", post(users::login))
        .route("/auth/reset-password", post(users::reset_password))
        .route("/auth/update-password", post(users::update_password))
        .route("/auth/confirm", get(users::confirm))
        .route("/noticeboard", get(pages::noticeboard))
        .route("/login/reset-password", get(pages::reset_password))
        .route("/emails/:template", get(pages::email_template))
        .with_state(state)
}

#[derive(Debug, Display)]
pub enum ApiError {
    #[display("{_0}")]
    Validation(String),
    #[display("No user authorized")]
    Unauthorized,
    #[display("You are not allowed to manage notices")]
    Forbidden,
    #[display("{_0}")]
    NotFound(String),
    /// The auth service refused the request, e.g. wrong credentials or an expired link.
    #[display("{_0}")]
    Auth(String),
    #[display("{_0}")]
    Unavailable(String),
    #[display("Internal server error")]
    Internal(anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Auth(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(e) => log::error!("request failed: {e:#}"),
            ApiError::Unavailable(e) => log::error!("the auth service failed: {e}"),
            _ => log::debug!("request rejected: {self}"),
        }
        let body = json!({
            "error": {
                "message": self.to_string()
            }
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<ValidationError>() {
            return Self::Validation(e.to_string())
        }
        match err.downcast_ref::<sqlx::Error>() {
            Some(sqlx::Error::RowNotFound) => Self::NotFound("Notice not found".to_owned()),
            Some(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() =>
                Self::NotFound("Notice not found".to_owned()),
            _ => Self::Internal(err)
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected(msg) => Self::Auth(msg),
            AuthError::Transport(e) => Self::Unavailable(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}
