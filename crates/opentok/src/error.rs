//! Error type for OpenTok operations.

use thiserror::Error;

/// Errors returned by token generation and the REST client.
#[derive(Error, Debug)]
pub enum OpenTokError {
    /// Caller-supplied input is malformed or outside policy
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The HMAC primitive could not be keyed
    #[error("Could not generate token, a signing error occurred: {0}")]
    Signing(String),

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("Request failed with status {status}: {message}")]
    Request {
        /// HTTP status code
        status: u16,
        /// Reason reported to the caller
        message: String,
    },

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The client could not be configured
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl OpenTokError {
    /// Bounded label for metrics.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            OpenTokError::InvalidArgument(_) => "invalid_argument",
            OpenTokError::Signing(_) => "signing",
            OpenTokError::Transport(_) => "transport",
            OpenTokError::Request { .. } => "request",
            OpenTokError::NotFound(_) => "not_found",
            OpenTokError::InvalidResponse(_) => "invalid_response",
            OpenTokError::Configuration(_) => "configuration",
        }
    }
}

/// Result type alias using `OpenTokError`
pub type Result<T> = std::result::Result<T, OpenTokError>;
