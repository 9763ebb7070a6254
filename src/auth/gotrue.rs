use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use crate::auth::{AuthError, AuthProvider, OtpType};
use crate::config::AuthConfig;
use crate::domain::{AuthUser, Email, Password, Session};

/// A client of the hosted GoTrue compatible authentication API.
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: Url,
    anon_key: String,
}

/// Different GoTrue versions report errors under different keys.
#[derive(Deserialize, Default)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self, status: StatusCode) -> String {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| format!("the auth service responded with {status}"))
    }
}

impl GoTrueClient {
    pub fn new(config: AuthConfig) -> anyhow::Result<Self> {
        let base_url = config.url.join("auth/v1/")?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            anon_key: config.anon_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url.join(path)
            .map_err(|e| AuthError::Rejected(format!("invalid auth endpoint '{path}': {e}")))
    }

    fn request(&self, method: reqwest::Method, url: Url, bearer: Option<&str>) -> reqwest::RequestBuilder {
        self.http.request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(&self.anon_key))
    }
}

async fn parse<T: for<'de> Deserialize<'de>>(resp: Response) -> Result<T, AuthError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp.json::<T>().await?)
    } else {
        let body = resp.json::<ErrorBody>().await.unwrap_or_default();
        let message = body.into_message(status);
        log::debug!("the auth service rejected a request ({status}): {message}");
        Err(AuthError::Rejected(message))
    }
}

/// The signup endpoint returns a bare user when email confirmation is required
/// and a whole session otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(Session),
    User(AuthUser),
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        let resp = self.request(reqwest::Method::GET, self.endpoint("user")?, Some(access_token))
            .send()
            .await?;
        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => parse(resp).await.map(Some),
        }
    }

    async fn sign_up(&self, email: &Email, password: &Password, redirect_to: &Url) -> Result<AuthUser, AuthError> {
        let mut url = self.endpoint("signup")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to.as_str());
        let resp = self.request(reqwest::Method::POST, url, None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let user = match parse::<SignUpResponse>(resp).await? {
            SignUpResponse::Session(session) => session.user,
            SignUpResponse::User(user) => user,
        };
        Ok(user)
    }

    async fn sign_in_with_password(&self, email: &Email, password: &Password) -> Result<Session, AuthError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let resp = self.request(reqwest::Method::POST, url, None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        parse(resp).await
    }

    async fn reset_password_for_email(&self, email: &Email, redirect_to: &Url) -> Result<(), AuthError> {
        let mut url = self.endpoint("recover")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to.as_str());
        let resp = self.request(reqwest::Method::POST, url, None)
            .json(&json!({ "email": email }))
            .send()
            .await?;
        parse::<serde_json::Value>(resp).await.map(|_| ())
    }

    async fn update_password(&self, access_token: &str, password: &Password) -> Result<AuthUser, AuthError> {
        let resp = self.request(reqwest::Method::PUT, self.endpoint("user")?, Some(access_token))
            .json(&json!({ "password": password }))
            .send()
            .await?;
        parse(resp).await
    }

    async fn verify_otp(&self, token_hash: &str, otp_type: OtpType) -> Result<Session, AuthError> {
        let resp = self.request(reqwest::Method::POST, self.endpoint("verify")?, None)
            .json(&json!({ "token_hash": token_hash, "type": otp_type }))
            .send()
            .await?;
        parse(resp).await
    }
}

#[cfg(test)]
mod test {
    use reqwest::{StatusCode, Url};
    use crate::config::AuthConfig;
    use super::{ErrorBody, GoTrueClient, SignUpResponse};

    #[test]
    fn endpoints_are_under_auth_v1() {
        let client = GoTrueClient::new(AuthConfig {
            url: Url::parse("https://project.supabase.co").unwrap(),
            anon_key: "anon".to_owned(),
        }).expect("couldn't create a client");
        assert_eq!(client.endpoint("user").unwrap().as_str(), "https://project.supabase.co/auth/v1/user");
        assert_eq!(client.endpoint("verify").unwrap().as_str(), "https://project.supabase.co/auth/v1/verify");
    }

    #[test]
    fn error_messages() {
        let body: ErrorBody = serde_json::from_str(r#"{"code":400,"msg":"User already registered"}"#).unwrap();
        assert_eq!(body.into_message(StatusCode::BAD_REQUEST), "User already registered");

        let body: ErrorBody = serde_json::from_str(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#).unwrap();
        assert_eq!(body.into_message(StatusCode::BAD_REQUEST), "Invalid login credentials");

        let body = ErrorBody::default();
        assert_eq!(body.into_message(StatusCode::BAD_GATEWAY), "the auth service responded with 502 Bad Gateway");
    }

    #[test]
    fn sign_up_response_shapes() {
        let id = uuid::Uuid::new_v4();
        let user = format!(r#"{{"id":"{id}","email":"a@b.io","aud":"authenticated"}}"#);
        let parsed: SignUpResponse = serde_json::from_str(&user).unwrap();
        assert!(matches!(parsed, SignUpResponse::User(u) if uuid::Uuid::from(u.id) == id));

        let session = format!(r#"{{"access_token":"t","token_type":"bearer","expires_in":3600,"refresh_token":"r","user":{user}}}"#);
        let parsed: SignUpResponse = serde_json::from_str(&session).unwrap();
        assert!(matches!(parsed, SignUpResponse::Session(s) if uuid::Uuid::from(s.user.id) == id));
    }
}
