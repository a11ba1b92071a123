//! Typed client for the platform's REST API.
//!
//! All console traffic goes through [`ApiClient`]: JSON in, JSON out,
//! success payloads unwrapped from the backend's `{ "data": ... }`
//! envelope, bearer tokens attached when a session is active. The
//! client itself is stateless; token handling and the refresh-retry
//! protocol live in [`crate::auth::AuthService`].

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::instrument;

use crate::config::ConsoleConfig;

pub mod types;

pub use types::{EmailStatus, ProfileUpdate};

/// Identity-service endpoints, relative to the API base URL.
///
/// Paths under `auth/` are exempt from the refresh-retry protocol.
pub(crate) mod endpoints {
    pub const CHECK_EMAIL: &str = "auth/check-email";
    pub const LOGIN: &str = "auth/login";
    pub const SETUP_PASSWORD: &str = "auth/setup-password";
    pub const REFRESH: &str = "auth/refresh";
    pub const CHANGE_PASSWORD: &str = "auth/change-password";
    pub const PROFILE: &str = "profile";
}

/// Errors from the REST boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection, timeout, TLS, body decode).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A payload did not match the expected shape.
    #[error("Unexpected response shape: {0}")]
    Parse(#[from] serde_json::Error),

    /// The service answered 401 for an authenticated request.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Any other non-success status, with the best-effort message
    /// extracted from the structured error body.
    #[error("Service error ({status}): {message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, or a generic fallback.
        message: String,
    },

    /// A success response carried no `data` payload.
    #[error("Response contained no data")]
    MissingData,
}

impl ApiError {
    /// The HTTP status this error was mapped from, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthenticated => Some(401),
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Success envelope used by every backend endpoint.
#[derive(Debug, serde::Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// Best-effort structured error body (`{message}` or `{error}`).
#[derive(Debug, Default, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// REST client for the platform API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    /// Base URL without a trailing slash.
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never
    /// happen under normal circumstances as we use standard TLS
    /// configuration.
    #[must_use]
    pub fn new(config: &ConsoleConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.as_str().trim_end_matches('/').to_owned(),
            }),
        }
    }

    /// The API base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Whether a path belongs to the identity endpoints, which never
    /// participate in the refresh-retry protocol.
    #[must_use]
    pub fn is_auth_path(path: &str) -> bool {
        path.trim_start_matches('/').starts_with("auth/")
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// POST a JSON body and unwrap the enveloped response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.start(reqwest::Method::POST, path, token).json(body).send().await?;
        Self::read_data(response).await
    }

    /// POST a JSON body, expecting no payload back.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn post_unit<B>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let response = self.start(reqwest::Method::POST, path, token).json(body).send().await?;
        Self::read_unit(response).await
    }

    /// Send a request with an arbitrary method and optional JSON body,
    /// returning the enveloped payload as raw JSON.
    ///
    /// This is the primitive the refresh-retry decorator wraps; page
    /// views use it (through the controller) for org-scoped data.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    #[instrument(skip(self, body, token), fields(path = %path))]
    pub async fn request_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: Option<&str>,
    ) -> Result<serde_json::Value, ApiError> {
        let mut request = self.start(method, path, token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::read_data(response).await
    }

    fn start(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut request = self.inner.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn read_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            let envelope: Envelope<T> = response.json().await?;
            envelope.data.ok_or(ApiError::MissingData)
        } else {
            Err(Self::status_error(status, response).await)
        }
    }

    async fn read_unit(response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::status_error(status, response).await)
        }
    }

    async fn status_error(status: reqwest::StatusCode, response: reqwest::Response) -> ApiError {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return ApiError::Unauthenticated;
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        let message = body
            .message
            .or(body.error)
            .unwrap_or_else(|| "Unknown error".to_owned());

        ApiError::Service {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> ApiClient {
        let config = ConsoleConfig::for_endpoint(
            url::Url::parse(base).unwrap(),
            std::path::PathBuf::from("/tmp/hwa-session.json"),
        );
        ApiClient::new(&config)
    }

    #[test]
    fn test_url_joining_tolerates_slashes() {
        let client = client_for("http://localhost:3000/api/");
        assert_eq!(
            client.url("/auth/login"),
            "http://localhost:3000/api/auth/login"
        );
        assert_eq!(client.url("profile"), "http://localhost:3000/api/profile");
    }

    #[test]
    fn test_auth_paths_are_recognized() {
        assert!(ApiClient::is_auth_path("auth/refresh"));
        assert!(ApiClient::is_auth_path("/auth/login"));
        assert!(!ApiClient::is_auth_path("profile"));
        assert!(!ApiClient::is_auth_path("/stats/overview"));
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError::Unauthenticated.status(), Some(401));
        let err = ApiError::Service {
            status: 409,
            message: "Email already in use".to_owned(),
        };
        assert_eq!(err.status(), Some(409));
        assert_eq!(
            err.to_string(),
            "Service error (409): Email already in use"
        );
    }

    #[test]
    fn test_error_body_extraction_shapes() {
        let body: ErrorBody = serde_json::from_str(r#"{"message":"nope"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("nope"));

        let body: ErrorBody = serde_json::from_str(r#"{"error":"bad"}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("bad"));

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.message.is_none() && body.error.is_none());
    }
}
