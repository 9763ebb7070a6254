use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use reqwest::Url;
use serde::Deserialize;
use crate::auth::OtpType;
use crate::domain::{AuthUser, Email, Password, Session};
use crate::metrics;
use super::extract::{CurrentUser, JsonOrForm, ACCESS_TOKEN_COOKIE};
use super::{AppState, HandlerResult};

#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
pub struct EmailForm {
    #[serde(default)]
    email: String,
}

#[derive(Deserialize)]
pub struct PasswordForm {
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
pub struct ConfirmQuery {
    token_hash: String,
    #[serde(rename = "type")]
    otp_type: OtpType,
    next: Option<String>,
}

impl CredentialsForm {
    fn validate(self) -> HandlerResult<(Email, Password)> {
        Ok((Email::new(self.email)?, Password::new(self.password)?))
    }
}

/// `Secure` is set whenever the site itself is served over https.
fn session_cookie(session: &Session, site_url: &Url) -> String {
    let secure = if site_url.scheme() == "https" { "; Secure" } else { "" };
    format!("{ACCESS_TOKEN_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
            session.access_token, session.expires_in.max(0))
}

/// Only paths of this site are accepted as redirect targets.
fn local_path(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
        _ => "/",
    }
}

pub async fn register(State(state): State<AppState>,
                      JsonOrForm(form): JsonOrForm<CredentialsForm>) -> HandlerResult<(StatusCode, Json<AuthUser>)> {
    let (email, password) = form.validate()?;
    let redirect_to = state.config.site_page("/login")?;
    match state.auth.sign_up(&email, &password, &redirect_to).await {
        Ok(user) => {
            metrics::REGISTRATION_COUNTER.succeeded();
            log::info!("user {} has signed up", user.id);
            Ok((StatusCode::CREATED, Json(user)))
        }
        Err(e) => {
            metrics::REGISTRATION_COUNTER.failed();
            Err(e.into())
        }
    }
}

pub async fn login(State(state): State<AppState>,
                   JsonOrForm(form): JsonOrForm<CredentialsForm>) -> HandlerResult<Response> {
    let (email, password) = form.validate()?;
    let session = state.auth.sign_in_with_password(&email, &password).await?;
    let cookie = session_cookie(&session, &state.config.site_url);
    Ok(([(SET_COOKIE, cookie)], Json(session)).into_response())
}

pub async fn reset_password(State(state): State<AppState>,
                            JsonOrForm(form): JsonOrForm<EmailForm>) -> HandlerResult<StatusCode> {
    let email = Email::new(form.email)?;
    let redirect_to = state.config.site_page("/settings/password")?;
    state.auth.reset_password_for_email(&email, &redirect_to).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_password(State(state): State<AppState>, CurrentUser { access_token, .. }: CurrentUser,
                             JsonOrForm(form): JsonOrForm<PasswordForm>) -> HandlerResult<Json<AuthUser>> {
    let password = Password::new(form.password)?;
    let user = state.auth.update_password(&access_token, &password).await?;
    log::info!("user {} has changed the password", user.id);
    Ok(Json(user))
}

pub async fn confirm(State(state): State<AppState>,
                     query: Result<Query<ConfirmQuery>, QueryRejection>) -> HandlerResult<Response> {
    let Query(query) = query?;
    let session = state.auth.verify_otp(&query.token_hash, query.otp_type).await?;
    log::info!("user {} has confirmed a {} link", session.user.id, query.otp_type);
    let next = local_path(query.next.as_deref());
    let cookie = session_cookie(&session, &state.config.site_url);
    Ok(([(SET_COOKIE, cookie)], Redirect::to(next)).into_response())
}

#[cfg(test)]
mod test {
    use reqwest::Url;
    use uuid::Uuid;
    use crate::domain::{AuthUser, Session, UserId};
    use super::{local_path, session_cookie};

    fn session() -> Session {
        Session {
            access_token: "token".to_owned(),
            token_type: "bearer".to_owned(),
            expires_in: 3600,
            refresh_token: "refresh".to_owned(),
            user: AuthUser { id: UserId::new(Uuid::new_v4()), email: None, new_email: None },
        }
    }

    #[test]
    fn cookie_is_secure_on_https_sites() {
        let cookie = session_cookie(&session(), &Url::parse("https://board.example.com").unwrap());
        assert_eq!(cookie, "access_token=token; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600; Secure");

        let cookie = session_cookie(&session(), &Url::parse("http://localhost:3000").unwrap());
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn only_local_redirects() {
        assert_eq!(local_path(Some("/settings/password")), "/settings/password");
        assert_eq!(local_path(Some("//evil.example.com")), "/");
        assert_eq!(local_path(Some("https://evil.example.com")), "/");
        assert_eq!(local_path(Some("/\\evil.example.com")), "/");
        assert_eq!(local_path(None), "/");
    }
}
