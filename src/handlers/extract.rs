use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use crate::domain::AuthUser;
use super::{ApiError, AppState};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// An authenticated user along with the token it was resolved from.
pub struct CurrentUser {
    pub user: AuthUser,
    pub access_token: String,
}

/// Resolves to `None` instead of rejecting anonymous requests.
pub struct MaybeUser(pub Option<AuthUser>);

/// An authenticated user who is allowed to manage notices.
pub struct AdminUser(pub AuthUser);

/// A body sent either by a script as JSON or by a plain HTML form.
pub struct JsonOrForm<T>(pub T);

/// Looks for a bearer token first and falls back to the session cookie.
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers.get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim());
    let cookie = || headers.get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, value)| value.trim());

    bearer.or_else(cookie)
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
}

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, ApiError> {
    let Some(access_token) = extract_access_token(&parts.headers) else {
        return Ok(None)
    };
    let user = state.auth.get_user(&access_token).await?;
    Ok(user.map(|user| CurrentUser { user, access_token }))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state).await?
            .ok_or(ApiError::Unauthorized)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = resolve_user(parts, state).await?
            .map(|current| current.user);
        Ok(Self(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser { user, .. } = CurrentUser::from_request_parts(parts, state).await?;
        if state.config.admins.allows(user.email.as_deref()) {
            Ok(Self(user))
        } else {
            log::warn!("user {} tried to manage notices", user.id);
            Err(ApiError::Forbidden)
        }
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers.get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().to_ascii_lowercase().starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

#[async_trait]
impl<T> FromRequest<AppState> for JsonOrForm<T>
where
    T: DeserializeOwned + Send + 'static
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

#[cfg(test)]
mod test {
    use axum::extract::FromRequestParts;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
    use axum::http::{HeaderMap, HeaderValue, Request};
    use crate::auth::fake::FakeAuth;
    use crate::handlers::test::app_state;
    use crate::handlers::ApiError;
    use super::{extract_access_token, is_form, AdminUser, CurrentUser, MaybeUser};

    fn headers(pairs: &[(axum::http::HeaderName, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(name.clone(), HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn bearer_token_wins_over_cookie() {
        let h = headers(&[(AUTHORIZATION, "Bearer abc"), (COOKIE, "access_token=def")]);
        assert_eq!(extract_access_token(&h).as_deref(), Some("abc"));
    }

    #[test]
    fn token_from_cookie() {
        let h = headers(&[(COOKIE, "theme=dark; access_token=def ; lang=en")]);
        assert_eq!(extract_access_token(&h).as_deref(), Some("def"));

        let h = headers(&[(COOKIE, "theme=dark"), (COOKIE, "access_token=xyz")]);
        assert_eq!(extract_access_token(&h).as_deref(), Some("xyz"));
    }

    #[test]
    fn no_token() {
        assert_eq!(extract_access_token(&HeaderMap::new()), None);
        assert_eq!(extract_access_token(&headers(&[(AUTHORIZATION, "Basic dXNlcg==")])), None);
        assert_eq!(extract_access_token(&headers(&[(AUTHORIZATION, "Bearer  ")])), None);
        assert_eq!(extract_access_token(&headers(&[(COOKIE, "access_token=")])), None);
    }

    #[test]
    fn auth_scheme_is_case_insensitive() {
        assert_eq!(extract_access_token(&headers(&[(AUTHORIZATION, "BEARER abc")])).as_deref(), Some("abc"));
        assert_eq!(extract_access_token(&headers(&[(AUTHORIZATION, "bEaReR  abc")])).as_deref(), Some("abc"));
        assert_eq!(extract_access_token(&headers(&[(AUTHORIZATION, "Bearerabc")])), None);
    }

    #[test]
    fn form_content_type() {
        assert!(is_form(&headers(&[(CONTENT_TYPE, "application/x-www-form-urlencoded")])));
        assert!(is_form(&headers(&[(CONTENT_TYPE, "Application/X-WWW-Form-Urlencoded; charset=UTF-8")])));
        assert!(!is_form(&headers(&[(CONTENT_TYPE, "application/json")])));
        assert!(!is_form(&HeaderMap::new()));
    }

    fn parts_with_token(token: &str) -> axum::http::request::Parts {
        let (parts, _) = Request::builder()
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .expect("valid request")
            .into_parts();
        parts
    }

    #[tokio::test]
    async fn users_are_resolved_through_the_auth_service() {
        let (auth, user) = FakeAuth::with_user("user@example.com", "12345");
        let state = app_state(auth, "");

        let mut parts = parts_with_token(&user.id.to_string());
        let current = CurrentUser::from_request_parts(&mut parts, &state).await
            .unwrap_or_else(|_| panic!("the user must be resolved"));
        assert_eq!(current.user, user);
        assert_eq!(current.access_token, user.id.to_string());

        let mut parts = parts_with_token("unknown");
        let rejection = CurrentUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(rejection, Err(ApiError::Unauthorized)));
        let MaybeUser(nobody) = MaybeUser::from_request_parts(&mut parts, &state).await
            .unwrap_or_else(|_| panic!("anonymous requests must be accepted"));
        assert!(nobody.is_none());
    }

    #[tokio::test]
    async fn only_listed_admins_manage_notices() {
        let (auth, user) = FakeAuth::with_user("user@example.com", "12345");
        let state = app_state(auth, "admin@example.com");
        let mut parts = parts_with_token(&user.id.to_string());
        let rejection = AdminUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(rejection, Err(ApiError::Forbidden)));

        let (auth, user) = FakeAuth::with_user("Admin@Example.com", "12345");
        let state = app_state(auth, "admin@example.com");
        let mut parts = parts_with_token(&user.id.to_string());
        assert!(AdminUser::from_request_parts(&mut parts, &state).await.is_ok());
    }
}
