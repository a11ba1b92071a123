//! Console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HWA_API_URL` - Base URL of the platform REST API
//!   (e.g., `http://localhost:3000/api`)
//!
//! ## Optional
//! - `HWA_SESSION_FILE` - Path of the persisted session file
//!   (default: `$HOME/.hwa/hwa_admin_session.json`)
//! - `HWA_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default request timeout applied at the HTTP-client boundary.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// File name of the session slot, after the original storage key.
const SESSION_FILE_NAME: &str = "hwa_admin_session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Console application configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the platform REST API.
    pub api_base_url: Url,
    /// Path of the single persisted session slot.
    pub session_file: PathBuf,
    /// Timeout for every identity-service request.
    pub request_timeout: Duration,
}

impl ConsoleConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = parse_api_url(&get_required_env("HWA_API_URL")?)?;

        let session_file = get_optional_env("HWA_SESSION_FILE").map_or_else(
            || default_session_file(get_optional_env("HOME")),
            PathBuf::from,
        );

        let request_timeout = parse_timeout(get_optional_env("HWA_HTTP_TIMEOUT_SECS"))?;

        Ok(Self {
            api_base_url,
            session_file,
            request_timeout,
        })
    }

    /// Build a configuration for a known API endpoint, keeping defaults
    /// for everything else. Used by tests and embedders.
    #[must_use]
    pub fn for_endpoint(api_base_url: Url, session_file: PathBuf) -> Self {
        Self {
            api_base_url,
            session_file,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("HWA_API_URL".to_owned(), e.to_string()))
}

fn parse_timeout(raw: Option<String>) -> Result<Duration, ConfigError> {
    match raw {
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        Some(value) => value.parse::<u64>().map(Duration::from_secs).map_err(|e| {
            ConfigError::InvalidEnvVar("HWA_HTTP_TIMEOUT_SECS".to_owned(), e.to_string())
        }),
    }
}

fn default_session_file(home: Option<String>) -> PathBuf {
    // Falls back to the working directory when HOME is unset (CI, containers)
    let base = home.map_or_else(|| PathBuf::from("."), PathBuf::from);
    base.join(".hwa").join(SESSION_FILE_NAME)
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_url() {
        assert!(parse_api_url("http://localhost:3000/api").is_ok());
        assert!(matches!(
            parse_api_url("not a url"),
            Err(ConfigError::InvalidEnvVar(var, _)) if var == "HWA_API_URL"
        ));
    }

    #[test]
    fn test_timeout_default_and_parse() {
        assert_eq!(parse_timeout(None).unwrap(), Duration::from_secs(30));
        assert_eq!(
            parse_timeout(Some("5".to_owned())).unwrap(),
            Duration::from_secs(5)
        );
        assert!(parse_timeout(Some("soon".to_owned())).is_err());
    }

    #[test]
    fn test_default_session_file_under_home() {
        let path = default_session_file(Some("/home/andi".to_owned()));
        assert_eq!(
            path,
            PathBuf::from("/home/andi/.hwa/hwa_admin_session.json")
        );
    }

    #[test]
    fn test_default_session_file_without_home() {
        let path = default_session_file(None);
        assert_eq!(path, PathBuf::from("./.hwa/hwa_admin_session.json"));
    }
}
