//! Session identity and session creation properties.

use crate::error::OpenTokError;
use crate::secret::SecretString;
use crate::token::{self, TokenOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Whether the service records a session automatically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveMode {
    /// Archives are started and stopped through the REST API.
    #[default]
    Manual,
    /// The session is archived as soon as a client publishes.
    Always,
}

impl ArchiveMode {
    /// Wire value for the `archiveMode` form parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ArchiveMode::Manual => "manual",
            ArchiveMode::Always => "always",
        }
    }
}

/// Properties a session is created with.
///
/// Forwarded verbatim to the session-creation call; the service decides
/// whether a combination is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionProperties {
    /// IP address hint used to pick the media server location.
    pub location: Option<IpAddr>,
    /// Prefer peer-to-peer media between clients.
    pub p2p: bool,
    /// Automatic or manual archiving.
    pub archive_mode: ArchiveMode,
}

impl SessionProperties {
    /// Form parameters for `POST /session/create`.
    #[must_use]
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        let mut form = Vec::with_capacity(3);
        if let Some(location) = self.location {
            form.push(("location", location.to_string()));
        }
        let preference = if self.p2p { "enabled" } else { "disabled" };
        form.push(("p2p.preference", preference.to_string()));
        form.push(("archiveMode", self.archive_mode.as_str().to_string()));
        form
    }
}

/// One remote session, as needed to sign tokens for it.
///
/// Immutable once built. The key/secret pair must be the one that owns the
/// session; a mismatched pair still signs, but the service rejects the
/// resulting tokens.
#[derive(Clone)]
pub struct Session {
    session_id: String,
    api_key: u32,
    api_secret: SecretString,
    properties: SessionProperties,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &self.session_id)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("properties", &self.properties)
            .finish()
    }
}

impl Session {
    /// Build a session identity for an already-issued session id.
    #[must_use]
    pub fn new(
        session_id: String,
        api_key: u32,
        api_secret: SecretString,
        properties: SessionProperties,
    ) -> Self {
        Self {
            session_id,
            api_key,
            api_secret,
            properties,
        }
    }

    /// Session identifier issued by the service.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Account key that owns the session.
    #[must_use]
    pub fn api_key(&self) -> u32 {
        self.api_key
    }

    pub(crate) fn api_secret(&self) -> &SecretString {
        &self.api_secret
    }

    /// Properties the session was created with.
    #[must_use]
    pub fn properties(&self) -> &SessionProperties {
        &self.properties
    }

    /// Generate a token for this session.
    ///
    /// # Errors
    ///
    /// - `OpenTokError::InvalidArgument` if the options are out of range
    /// - `OpenTokError::Signing` if the secret cannot key the HMAC
    pub fn generate_token(&self, options: &TokenOptions) -> Result<String, OpenTokError> {
        token::generate_token(self, options)
    }

    /// Generate a publisher token that expires in 24 hours and carries no
    /// connection data.
    ///
    /// # Errors
    ///
    /// Returns `OpenTokError::Signing` if the secret cannot key the HMAC.
    pub fn generate_default_token(&self) -> Result<String, OpenTokError> {
        token::generate_token(self, &TokenOptions::default())
    }
}
