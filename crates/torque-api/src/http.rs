//! # HTTP Transport
//!
//! [`ApiTransport`] is the seam between the portal services and the network.
//! [`HttpClient`] implements it with `reqwest`; tests use an in-memory
//! transport instead.
//!
//! ## Response Handling
//! ```text
//!   2xx, empty body      ──► Value::Null
//!   2xx, JSON body       ──► Value
//!   401 / 403            ──► SessionExpired { redirect: {base}/login?error=session_expired }
//!   other status         ──► Http { status, message from body "message"/"error" }
//!   no response          ──► Network
//! ```

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::auth::login_redirect;
use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};

/// Everything the portal services need from the network.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// `GET path`, parsed as JSON.
    async fn get_json(&self, path: &str) -> ClientResult<Value>;

    /// `POST`/`PUT path` with a JSON body.
    async fn send_json(&self, method: Method, path: &str, body: &Value) -> ClientResult<Value>;

    /// `GET path`, raw bytes (PDF downloads).
    async fn get_bytes(&self, path: &str) -> ClientResult<Vec<u8>>;
}

/// `reqwest`-backed transport with bearer auth.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(settings: &ApiSettings) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: normalize_base(&settings.base_url)?,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> ClientResult<reqwest::Response> {
        let url = self.url(path)?;
        debug!(%method, %url, "Sending request");

        let mut request = self.client.request(method, url);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.check_status(response).await
    }

    async fn check_status(&self, response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(status = status.as_u16(), "Session rejected by backend");
                Err(ClientError::SessionExpired {
                    redirect: login_redirect(&self.base_url),
                })
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::Http {
                    status: status.as_u16(),
                    message: error_message(&text, status),
                })
            }
        }
    }
}

#[async_trait]
impl ApiTransport for HttpClient {
    async fn get_json(&self, path: &str) -> ClientResult<Value> {
        let response = self.send(Method::GET, path, None).await?;
        parse_body(&response.bytes().await?)
    }

    async fn send_json(&self, method: Method, path: &str, body: &Value) -> ClientResult<Value> {
        let response = self.send(method, path, Some(body)).await?;
        parse_body(&response.bytes().await?)
    }

    async fn get_bytes(&self, path: &str) -> ClientResult<Vec<u8>> {
        let response = self.send(Method::GET, path, None).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Ensures the base URL ends in `/` so endpoint paths join under it.
fn normalize_base(base_url: &str) -> ClientResult<Url> {
    let mut url = Url::parse(base_url.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_body(bytes: &[u8]) -> ClientResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// Prefers the backend's `message`/`error` field over the raw body.
fn error_message(body: &str, status: StatusCode) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["message", "error"]
            .iter()
            .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
    });
    match from_json {
        Some(message) if !message.trim().is_empty() => message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_joins_under_prefix() {
        let settings = ApiSettings {
            base_url: "https://portal.torque.example/garage".to_string(),
            timeout_secs: 5,
        };
        let client = HttpClient::new(&settings).unwrap();
        assert_eq!(
            client.url("/admin/api/vehicles-due").unwrap().as_str(),
            "https://portal.torque.example/garage/admin/api/vehicles-due"
        );
        assert_eq!(
            login_redirect(client.base_url()),
            "https://portal.torque.example/garage/login?error=session_expired"
        );
    }

    #[test]
    fn test_auth_header() {
        let client = HttpClient::new(&ApiSettings::default()).unwrap();
        assert_eq!(client.auth_header(), None);
        let client = client.with_token("abc");
        assert_eq!(client.auth_header().as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn test_invalid_base_url() {
        let settings = ApiSettings {
            base_url: "::nope".to_string(),
            timeout_secs: 5,
        };
        assert!(matches!(HttpClient::new(&settings), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b"").unwrap(), Value::Null);
        assert_eq!(parse_body(b" \n").unwrap(), Value::Null);
        assert_eq!(parse_body(br#"{"ok":true}"#).unwrap(), json!({"ok": true}));
        assert!(matches!(parse_body(b"<html>"), Err(ClientError::InvalidResponse(_))));
    }

    #[test]
    fn test_error_message_extraction() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(error_message(r#"{"message":"Invoice already exists"}"#, status), "Invoice already exists");
        assert_eq!(error_message(r#"{"error":"Bad amount"}"#, status), "Bad amount");
        assert_eq!(error_message("plain failure", status), "plain failure");
        assert_eq!(error_message("", status), "Bad Request");
    }
}
