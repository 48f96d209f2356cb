//! REST client for session creation and archive management.
//!
//! # Authentication
//!
//! Every request carries `X-TB-PARTNER-AUTH: <api_key>:<api_secret>`. The
//! header value is marked sensitive so it is never printed by the HTTP
//! stack, and the secret itself never appears in logs or metrics.
//!
//! Tokens are signed locally (see [`crate::token`]); no request is made to
//! generate one.

use crate::archive::{Archive, ArchiveList, ArchiveListOptions, StartArchiveRequest};
use crate::config::{ClientConfig, DEFAULT_CONNECT_TIMEOUT};
use crate::error::OpenTokError;
use crate::observability::metrics::record_api_request;
use crate::secret::{ExposeSecret, SecretString};
use crate::session::{Session, SessionProperties};
use crate::token::TokenOptions;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, instrument, trace, warn};
use uuid::Uuid;

/// Header carrying the partner credentials.
pub const PARTNER_AUTH_HEADER: &str = "x-tb-partner-auth";

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("OpenTok-Rust-SDK/", env!("CARGO_PKG_VERSION"));

/// One entry of the session-creation response.
#[derive(Debug, Deserialize)]
struct CreatedSession {
    session_id: String,
}

/// Error body returned by the REST API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the OpenTok REST API.
///
/// Built once from a [`ClientConfig`] and shared; clones share the same
/// connection pool. Holds no mutable state.
#[derive(Clone)]
pub struct OpenTok {
    api_key: u32,
    api_secret: SecretString,
    api_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for OpenTok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenTok")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl OpenTok {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns `OpenTokError::Configuration` if the secret cannot be sent as
    /// a header or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, OpenTokError> {
        let mut auth = HeaderValue::from_str(&format!(
            "{}:{}",
            config.api_key,
            config.api_secret.expose_secret()
        ))
        .map_err(|_| {
            OpenTokError::Configuration("API secret is not a valid header value".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(PARTNER_AUTH_HEADER), auth);

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.http_timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                error!(target: "opentok.client", error = %e, "Failed to build HTTP client");
                OpenTokError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            api_key: config.api_key,
            api_secret: config.api_secret,
            api_url: config.api_url,
            http,
        })
    }

    /// Account key this client acts for.
    #[must_use]
    pub fn api_key(&self) -> u32 {
        self.api_key
    }

    // =========================================================================
    // Sessions and tokens
    // =========================================================================

    /// Create a session on the service.
    ///
    /// # Errors
    ///
    /// - `OpenTokError::Transport` if the service is unreachable
    /// - `OpenTokError::Request` for a non-success status
    /// - `OpenTokError::InvalidResponse` if no session id comes back
    #[instrument(skip_all, fields(p2p = properties.p2p, archive_mode = properties.archive_mode.as_str()))]
    pub async fn create_session(
        &self,
        properties: &SessionProperties,
    ) -> Result<Session, OpenTokError> {
        let request = self
            .http
            .post(format!("{}/session/create", self.api_url))
            .header(ACCEPT, "application/json")
            .form(&properties.to_form());

        let created: Vec<CreatedSession> = self.call("create_session", request).await?;
        let session_id = created
            .into_iter()
            .next()
            .map(|s| s.session_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                warn!(target: "opentok.client", "Session creation returned no session id");
                OpenTokError::InvalidResponse("No session id in response".to_string())
            })?;

        debug!(target: "opentok.client", session_id = %session_id, "Session created");

        Ok(Session::new(
            session_id,
            self.api_key,
            self.api_secret.clone(),
            properties.clone(),
        ))
    }

    /// Session identity for an existing session id, for signing tokens.
    ///
    /// # Errors
    ///
    /// Returns `OpenTokError::InvalidArgument` if `session_id` is empty.
    pub fn session(&self, session_id: &str) -> Result<Session, OpenTokError> {
        if session_id.is_empty() {
            return Err(OpenTokError::InvalidArgument(
                "Session id cannot be empty".to_string(),
            ));
        }
        Ok(Session::new(
            session_id.to_string(),
            self.api_key,
            self.api_secret.clone(),
            SessionProperties::default(),
        ))
    }

    /// Generate a token for `session_id` with this client's credentials.
    ///
    /// # Errors
    ///
    /// - `OpenTokError::InvalidArgument` for an empty session id or
    ///   out-of-range options
    /// - `OpenTokError::Signing` if the secret cannot key the HMAC
    pub fn generate_token(
        &self,
        session_id: &str,
        options: &TokenOptions,
    ) -> Result<String, OpenTokError> {
        self.session(session_id)?.generate_token(options)
    }

    // =========================================================================
    // Archives
    // =========================================================================

    fn archive_url(&self) -> String {
        format!("{}/v2/partner/{}/archive", self.api_url, self.api_key)
    }

    /// Start recording a session.
    ///
    /// The session must have connected clients.
    ///
    /// # Errors
    ///
    /// - `OpenTokError::Request` with status 404/409 if the session cannot
    ///   be recorded right now
    /// - transport and parse errors as for every call
    #[instrument(skip(self, name))]
    pub async fn start_archive(
        &self,
        session_id: &str,
        name: Option<&str>,
    ) -> Result<Archive, OpenTokError> {
        if session_id.is_empty() {
            return Err(OpenTokError::InvalidArgument(
                "Session id cannot be empty".to_string(),
            ));
        }

        let request = self
            .http
            .post(self.archive_url())
            .json(&StartArchiveRequest { session_id, name });

        let archive: Archive = self.call("start_archive", request).await?;
        debug!(target: "opentok.client", archive_id = %archive.id, "Archive started");
        Ok(archive)
    }

    /// Stop a recording.
    ///
    /// # Errors
    ///
    /// - `OpenTokError::NotFound` if the archive does not exist
    /// - `OpenTokError::Request` with status 409 if it is not recording
    #[instrument(skip(self))]
    pub async fn stop_archive(&self, archive_id: Uuid) -> Result<Archive, OpenTokError> {
        let request = self
            .http
            .post(format!("{}/{archive_id}/stop", self.archive_url()));

        let archive: Archive = self.call("stop_archive", request).await?;
        debug!(target: "opentok.client", archive_id = %archive.id, "Archive stopped");
        Ok(archive)
    }

    /// Fetch one archive.
    ///
    /// # Errors
    ///
    /// Returns `OpenTokError::NotFound` if the archive does not exist.
    #[instrument(skip(self))]
    pub async fn get_archive(&self, archive_id: Uuid) -> Result<Archive, OpenTokError> {
        let request = self.http.get(format!("{}/{archive_id}", self.archive_url()));
        self.call("get_archive", request).await
    }

    /// List archives for the account, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `OpenTokError::InvalidArgument` for an oversized page before
    /// any request is made.
    #[instrument(skip_all, fields(offset = ?options.offset, count = ?options.count))]
    pub async fn list_archives(
        &self,
        options: &ArchiveListOptions,
    ) -> Result<ArchiveList, OpenTokError> {
        let query = options.to_query()?;
        let request = self.http.get(self.archive_url()).query(&query);
        self.call("list_archives", request).await
    }

    /// Delete an archive's file and record.
    ///
    /// # Errors
    ///
    /// - `OpenTokError::NotFound` if the archive does not exist
    /// - `OpenTokError::Request` with status 409 if it is still recording
    #[instrument(skip(self))]
    pub async fn delete_archive(&self, archive_id: Uuid) -> Result<(), OpenTokError> {
        let request = self
            .http
            .delete(format!("{}/{archive_id}", self.archive_url()));

        let start = Instant::now();
        let result = self.send("delete_archive", request).await.map(|_| ());
        record_api_request("delete_archive", status_label(&result), start.elapsed());

        if result.is_ok() {
            debug!(target: "opentok.client", archive_id = %archive_id, "Archive deleted");
        }
        result
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Send a request and parse a JSON body, recording metrics.
    async fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, OpenTokError> {
        let start = Instant::now();
        let result = match self.send(operation, request).await {
            Ok(response) => response.json::<T>().await.map_err(|e| {
                error!(target: "opentok.client", operation, error = %e, "Failed to parse response");
                OpenTokError::InvalidResponse(format!("{operation}: {e}"))
            }),
            Err(e) => Err(e),
        };
        record_api_request(operation, status_label(&result), start.elapsed());
        result
    }

    /// Send a request and map non-success statuses to errors.
    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, OpenTokError> {
        let response = request.send().await.map_err(|e| {
            warn!(target: "opentok.client", operation, error = %e, "Request failed");
            OpenTokError::Transport(format!("{operation}: {e}"))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_else(|e| {
            trace!(target: "opentok.client", error = %e, "Failed to read error response body");
            String::new()
        });
        trace!(target: "opentok.client", operation, body = %body, "Error response body");

        Err(map_error_status(operation, status, &body))
    }
}

fn map_error_status(operation: &'static str, status: StatusCode, body: &str) -> OpenTokError {
    if status == StatusCode::NOT_FOUND {
        debug!(target: "opentok.client", operation, "Resource not found");
        return OpenTokError::NotFound(reason(status, body));
    }

    if status.is_server_error() {
        warn!(target: "opentok.client", operation, status = %status, "OpenTok returned server error");
        return OpenTokError::Request {
            status: status.as_u16(),
            message: "OpenTok service unavailable".to_string(),
        };
    }

    if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
        error!(target: "opentok.client", operation, status = %status, "Partner credentials rejected");
    } else {
        warn!(target: "opentok.client", operation, status = %status, "Unexpected OpenTok response");
    }

    OpenTokError::Request {
        status: status.as_u16(),
        message: reason(status, body),
    }
}

/// Message from the error body, or the status reason phrase.
fn reason(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        })
}

fn status_label<T>(result: &Result<T, OpenTokError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) => e.category(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn test_client() -> OpenTok {
        OpenTok::new(ClientConfig::new(
            123_456,
            SecretString::from("1234567890abcdef1234567890abcdef1234567890"),
        ))
        .unwrap()
    }

    #[test]
    fn test_user_agent_carries_version() {
        assert!(USER_AGENT.starts_with("OpenTok-Rust-SDK/"));
        assert!(USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", test_client());
        assert!(debug.contains("123456"));
        assert!(!debug.contains("1234567890abcdef"));
    }

    #[test]
    fn test_secret_with_newline_is_rejected() {
        let err = OpenTok::new(ClientConfig::new(1, SecretString::from("bad\nsecret"))).unwrap_err();
        assert!(matches!(err, OpenTokError::Configuration(_)));
    }

    #[test]
    fn test_session_rejects_empty_id() {
        let client = test_client();
        assert!(matches!(
            client.session(""),
            Err(OpenTokError::InvalidArgument(_))
        ));
        assert!(matches!(
            client.generate_token("", &TokenOptions::default()),
            Err(OpenTokError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_archive_url() {
        let client = OpenTok::new(
            ClientConfig::new(123_456, SecretString::from("secret"))
                .with_api_url("http://localhost:8080/"),
        )
        .unwrap();
        assert_eq!(
            client.archive_url(),
            "http://localhost:8080/v2/partner/123456/archive"
        );
    }

    #[test]
    fn test_map_error_status() {
        let err = map_error_status("get_archive", StatusCode::NOT_FOUND, "");
        assert!(matches!(err, OpenTokError::NotFound(ref m) if m == "Not Found"));

        let err = map_error_status(
            "stop_archive",
            StatusCode::CONFLICT,
            r#"{"message":"Archive is not recording"}"#,
        );
        assert!(matches!(
            err,
            OpenTokError::Request { status: 409, ref message } if message == "Archive is not recording"
        ));

        let err = map_error_status(
            "create_session",
            StatusCode::BAD_GATEWAY,
            r#"{"message":"internal detail"}"#,
        );
        assert!(matches!(
            err,
            OpenTokError::Request { status: 502, ref message } if message == "OpenTok service unavailable"
        ));

        let err = map_error_status("list_archives", StatusCode::FORBIDDEN, "not json");
        assert!(matches!(
            err,
            OpenTokError::Request { status: 403, ref message } if message == "Forbidden"
        ));
    }
}
