//! Client configuration.
//!
//! Configuration is loaded from environment variables. The API secret is
//! redacted in Debug output.

use crate::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.opentok.com";

/// Default HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect timeout for the HTTP client.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Credentials and endpoint for an [`OpenTok`](crate::OpenTok) client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Account (partner) key.
    pub api_key: u32,

    /// Account secret, used to sign tokens and authenticate REST calls.
    pub api_secret: SecretString,

    /// REST endpoint, without a trailing slash.
    pub api_url: String,

    /// HTTP request timeout.
    pub http_timeout: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("Invalid HTTP timeout: {0}")]
    InvalidHttpTimeout(String),
}

impl ClientConfig {
    /// Create a configuration for the production endpoint.
    #[must_use]
    pub fn new(api_key: u32, api_secret: SecretString) -> Self {
        Self {
            api_key,
            api_secret,
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Point the client at a different endpoint.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_vars`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    ///
    /// Reads `OPENTOK_API_KEY` and `OPENTOK_API_SECRET` (required),
    /// `OPENTOK_API_URL` and `OPENTOK_HTTP_TIMEOUT_SECONDS` (optional).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// does not parse.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let api_key_str = vars
            .get("OPENTOK_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENTOK_API_KEY".to_string()))?;
        let api_key: u32 = api_key_str.parse().map_err(|e| {
            ConfigError::InvalidApiKey(format!(
                "OPENTOK_API_KEY must be a positive integer, got '{api_key_str}': {e}"
            ))
        })?;

        let api_secret = vars
            .get("OPENTOK_API_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENTOK_API_SECRET".to_string()))?;

        let mut config = Self::new(api_key, SecretString::from(api_secret.clone()));

        if let Some(api_url) = vars.get("OPENTOK_API_URL") {
            config = config.with_api_url(api_url.as_str());
        }

        if let Some(value_str) = vars.get("OPENTOK_HTTP_TIMEOUT_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidHttpTimeout(format!(
                    "OPENTOK_HTTP_TIMEOUT_SECONDS must be a valid positive integer, got '{value_str}': {e}"
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidHttpTimeout(
                    "OPENTOK_HTTP_TIMEOUT_SECONDS must be greater than 0".to_string(),
                ));
            }

            config = config.with_http_timeout(Duration::from_secs(value));
        }

        Ok(config)
    }
}
