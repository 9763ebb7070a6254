use std::str::FromStr;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use crate::emails::{render_email, EmailKind, Placeholders};
use super::admin::NoticeStats;
use super::extract::MaybeUser;
use super::{ApiError, AppState, HandlerResult};

const RESET_PASSWORD_FORM: &str = r#"<form method="post" action="/auth/reset-password">
  <label for="email">Email</label>
  <input id="email" name="email" type="email" required>
  <button type="submit">Send reset link</button>
</form>
"#;

const EMAIL_SUBJECT_HEADER: &str = "x-email-subject";

/// The admin dashboard: anonymous visitors are sent to the login page.
pub async fn noticeboard(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> HandlerResult<Response> {
    let Some(user) = user else {
        return Ok(Redirect::to("/login").into_response())
    };
    if !state.config.admins.allows(user.email.as_deref()) {
        return Err(ApiError::Forbidden)
    }
    let notices = state.board.get_all_notices_with_stats().await?;
    Ok(Json(NoticeStats::from(notices)).into_response())
}

/// Signed in users have nothing to reset here and manage their password in the settings.
pub async fn reset_password(MaybeUser(user): MaybeUser) -> Response {
    match user {
        Some(_) => Redirect::to("/settings").into_response(),
        None => Html(RESET_PASSWORD_FORM).into_response(),
    }
}

/// Without a query the templates are returned with the auth service's tokens, ready to be uploaded.
pub async fn email_template(State(state): State<AppState>, Path(template): Path<String>,
                            placeholders: Result<Query<Placeholders>, QueryRejection>) -> HandlerResult<Response> {
    let kind = EmailKind::from_str(&template)
        .map_err(|_| ApiError::NotFound(format!("Unknown email template: {template}")))?;
    let Query(placeholders) = placeholders?;

    let email = if placeholders == Placeholders::default() {
        state.emails.get(kind).cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Unknown email template: {template}")))?
    } else {
        render_email(kind, &placeholders)
            .map_err(|e| anyhow::anyhow!("couldn't render the {template} email: {e}"))?
    };
    Ok(([(EMAIL_SUBJECT_HEADER, email.subject)], Html(email.html)).into_response())
}
