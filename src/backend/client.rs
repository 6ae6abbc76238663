//! HTTP client for the external identity/summary backend

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use super::IdentityBackend;
use crate::models::{AuthResponse, SignInRequest, SignUpRequest};
use crate::settings::BackendSettings;

/// Message returned to users when the backend cannot be reached
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "Could not connect to the server. Please try again later.";

/// Failure shapes of a backend call
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum BackendError {
    /// Transport failure; the request may be retried
    #[error("{0}")]
    Unavailable(String),
    /// Non-2xx JSON reply, message reported verbatim
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// Body was not JSON or lacked required fields
    #[error("{0}")]
    InvalidResponse(String),
}

impl BackendError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401, .. })
    }
}

/// Pagination and search for the summary listing
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SummaryQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub search: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl Default for SummaryQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            search: None,
        }
    }
}

impl SummaryQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// Client for the identity/summary server
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns an error if the server URL is not a valid base URL or the
    /// HTTP client cannot be built.
    pub fn new(settings: &BackendSettings) -> anyhow::Result<Self> {
        let base_url = Url::parse(&settings.server_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("backend server_url cannot be used as a base: {base_url}");
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(concat!("knugget-web/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{server_url}/{segments...}` with each segment percent-encoded
    #[must_use]
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str], token: Option<&str>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.endpoint(segments))
            .header("Content-Type", "application/json");
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and classify the reply
    async fn send_json(
        &self,
        builder: RequestBuilder,
        default_error: &str,
    ) -> Result<Value, BackendError> {
        let response = builder.send().await.map_err(|e| {
            error!("Network error reaching backend: {e}");
            BackendError::Unavailable(SERVICE_UNAVAILABLE_MESSAGE.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read backend response body: {e}");
            BackendError::Unavailable(SERVICE_UNAVAILABLE_MESSAGE.to_string())
        })?;
        debug!("Backend responded with status {status}");

        classify_response(status.as_u16(), &body, default_error)
    }

    async fn exchange(
        &self,
        segments: &[&str],
        body: Value,
        default_error: &str,
    ) -> Result<AuthResponse, BackendError> {
        let value = self
            .send_json(self.request(Method::POST, segments, None).json(&body), default_error)
            .await?;
        serde_json::from_value(value).map_err(|e| {
            warn!("Backend credential response has unexpected shape: {e}");
            BackendError::InvalidResponse(format!("Invalid response from server: {e}"))
        })
    }

    /// Profile of the bearer's user
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] classifying the failure.
    pub async fn me(&self, token: &str) -> Result<Value, BackendError> {
        self.send_json(
            self.request(Method::GET, &["auth", "me"], Some(token)),
            "Authentication failed",
        )
        .await
    }

    /// One page of the user's summaries
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] classifying the failure.
    pub async fn list_summaries(
        &self,
        token: &str,
        query: &SummaryQuery,
    ) -> Result<Value, BackendError> {
        self.send_json(
            self.request(Method::GET, &["summary"], Some(token))
                .query(&query.pairs()),
            "Failed to fetch summaries",
        )
        .await
    }

    /// # Errors
    ///
    /// Returns a [`BackendError`] classifying the failure.
    pub async fn get_summary(&self, token: &str, id: &str) -> Result<Value, BackendError> {
        self.send_json(
            self.request(Method::GET, &["summary", id], Some(token)),
            "Failed to fetch summary",
        )
        .await
    }

    /// # Errors
    ///
    /// Returns a [`BackendError`] classifying the failure.
    pub async fn delete_summary(&self, token: &str, id: &str) -> Result<Value, BackendError> {
        self.send_json(
            self.request(Method::DELETE, &["summary", id], Some(token)),
            "Failed to delete summary",
        )
        .await
    }

    /// # Errors
    ///
    /// Returns a [`BackendError`] classifying the failure.
    pub async fn get_transcript(&self, token: &str, id: &str) -> Result<Value, BackendError> {
        self.send_json(
            self.request(Method::GET, &["summary", id, "transcript"], Some(token)),
            "Failed to get transcript",
        )
        .await
    }
}

#[async_trait]
impl IdentityBackend for BackendClient {
    async fn sign_in(&self, credentials: &SignInRequest) -> Result<AuthResponse, BackendError> {
        self.exchange(
            &["auth", "signin"],
            json!({"email": credentials.email, "password": credentials.password}),
            "Authentication failed",
        )
        .await
    }

    async fn sign_up(&self, credentials: &SignUpRequest) -> Result<AuthResponse, BackendError> {
        self.exchange(
            &["auth", "signup"],
            json!({
                "name": credentials.name,
                "email": credentials.email,
                "password": credentials.password,
            }),
            "Registration failed",
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, BackendError> {
        self.exchange(
            &["auth", "refresh"],
            json!({"refreshToken": refresh_token}),
            "Failed to refresh token",
        )
        .await
    }
}

/// Classify a backend reply by status and body
///
/// # Errors
///
/// `InvalidResponse` for bodies that are not JSON, `Rejected` for non-2xx
/// replies (message taken from `error` or `message`, else `default_error`).
pub fn classify_response(status: u16, body: &str, default_error: &str) -> Result<Value, BackendError> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let snippet: String = body.chars().take(200).collect();
        warn!("Backend returned non-JSON body with status {status}");
        return Err(BackendError::InvalidResponse(format!(
            "Non-JSON response received: {snippet}"
        )));
    };

    if (200..300).contains(&status) {
        return Ok(value);
    }

    let message = ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .unwrap_or(default_error)
        .to_string();
    Err(BackendError::Rejected { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(server_url: &str) -> BackendClient {
        BackendClient::new(&BackendSettings {
            server_url: server_url.to_string(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = backend("http://localhost:3000/api");
        assert_eq!(
            client.endpoint(&["auth", "signin"]).as_str(),
            "http://localhost:3000/api/auth/signin"
        );

        let client = backend("http://localhost:3000/api/");
        assert_eq!(
            client.endpoint(&["summary", "abc", "transcript"]).as_str(),
            "http://localhost:3000/api/summary/abc/transcript"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let client = backend("http://localhost:3000/api");
        assert_eq!(
            client.endpoint(&["summary", "../admin"]).as_str(),
            "http://localhost:3000/api/summary/..%2Fadmin"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let settings = BackendSettings {
            server_url: "mailto:someone@example.com".to_string(),
            request_timeout_secs: 5,
        };
        assert!(BackendClient::new(&settings).is_err());
    }

    #[test]
    fn test_classify_success() {
        let value = classify_response(200, r#"{"token":"t1"}"#, "x").unwrap();
        assert_eq!(value["token"], "t1");
    }

    #[test]
    fn test_classify_rejection_uses_backend_message() {
        assert_eq!(
            classify_response(401, r#"{"error":"Invalid credentials"}"#, "Authentication failed"),
            Err(BackendError::Rejected {
                status: 401,
                message: "Invalid credentials".to_string()
            })
        );
        assert_eq!(
            classify_response(409, r#"{"message":"Email taken"}"#, "Registration failed"),
            Err(BackendError::Rejected {
                status: 409,
                message: "Email taken".to_string()
            })
        );
        assert_eq!(
            classify_response(500, "{}", "Registration failed"),
            Err(BackendError::Rejected {
                status: 500,
                message: "Registration failed".to_string()
            })
        );
    }

    #[test]
    fn test_classify_non_json() {
        let err = classify_response(502, "<html>Bad Gateway</html>", "x").unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
        assert!(err.to_string().starts_with("Non-JSON response received"));

        // A 200 with a non-JSON body is never treated as success
        assert!(matches!(
            classify_response(200, "ok", "x"),
            Err(BackendError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_summary_query_pairs() {
        let query = SummaryQuery::default();
        assert_eq!(
            query.pairs(),
            vec![("page", "1".to_string()), ("limit", "10".to_string())]
        );

        let query = SummaryQuery {
            page: 2,
            limit: 5,
            search: Some("rust".to_string()),
        };
        assert_eq!(query.pairs().len(), 3);
    }
}
