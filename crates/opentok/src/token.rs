//! Token generation and decoding.
//!
//! A token is a signed, self-describing credential for one session:
//!
//! ```text
//! "T1==" + base64url( "partner_id=" key "&sig=" hex(HMAC-SHA1(secret, data)) ":" data )
//!
//! data = "session_id=" id
//!        "&create_time=" secs
//!        "&nonce=" i32
//!        "&role=" role
//!        "&expire_time=" secs
//!      [ "&connection_data=" form_urlencoded(connection_data) ]
//! ```
//!
//! The service verifies the signature over the exact bytes of `data`, so the
//! field order and integer formatting are part of the wire contract.
//!
//! # Validation
//!
//! All options are checked before anything is encoded or signed:
//!
//! - `expire_time` unset or `0` resolves to `create_time + 1 day`
//! - otherwise it must lie in `[now - 1, now + 30 days]`
//! - `connection_data` may hold at most [`MAX_CONNECTION_DATA_LENGTH`] UTF-16 units

use crate::crypto;
use crate::error::OpenTokError;
use crate::observability::metrics::record_token_generation;
use crate::secret::SecretString;
use crate::session::Session;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Version tag every token starts with.
pub const TOKEN_SENTINEL: &str = "T1==";

/// Longest connection data the service accepts.
///
/// Measured in UTF-16 code units, as the service counts them, so a
/// character outside the Basic Multilingual Plane counts twice.
pub const MAX_CONNECTION_DATA_LENGTH: usize = 1000;

/// Lifetime of a token when no expiry is requested (1 day).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60 * 24;

/// Longest lifetime the service accepts (30 days).
pub const MAX_TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 30;

/// An expiry this far in the past is still accepted.
const EXPIRY_TOLERANCE_SECS: i64 = 1;

// =============================================================================
// Role
// =============================================================================

/// Access level granted by a token. Enforced by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can only subscribe to streams.
    Subscriber,
    /// Can publish, subscribe and signal.
    #[default]
    Publisher,
    /// Publisher rights plus force-unpublish and force-disconnect.
    Moderator,
}

impl Role {
    /// Wire value used in the data string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Subscriber => "subscriber",
            Role::Publisher => "publisher",
            Role::Moderator => "moderator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = OpenTokError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscriber" => Ok(Role::Subscriber),
            "publisher" => Ok(Role::Publisher),
            "moderator" => Ok(Role::Moderator),
            other => Err(OpenTokError::InvalidArgument(format!(
                "Unknown role: {other}"
            ))),
        }
    }
}

// =============================================================================
// Options
// =============================================================================

/// Options for a single token.
///
/// `None` means "not specified"; the generator applies the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenOptions {
    /// Role granted by the token (default: publisher).
    pub role: Option<Role>,
    /// Absolute expiry in seconds since the epoch. `Some(0)` counts as unset.
    pub expire_time: Option<i64>,
    /// Metadata describing the end user, visible to other clients.
    pub connection_data: Option<String>,
}

// =============================================================================
// Generation
// =============================================================================

/// Generate a token for `session`, reading the wall clock and drawing a
/// fresh nonce.
///
/// # Errors
///
/// - `OpenTokError::InvalidArgument` if the options are out of range
/// - `OpenTokError::Signing` if the secret cannot key the HMAC
pub fn generate_token(session: &Session, options: &TokenOptions) -> Result<String, OpenTokError> {
    let now = chrono::Utc::now().timestamp();
    let nonce: i32 = rand::random();
    generate_token_at(session, options, now, nonce)
}

/// Generate a token with an explicit clock reading and nonce.
///
/// `now` is both the `create_time` written into the token and the reference
/// point for expiry validation. Identical inputs give identical tokens.
///
/// # Errors
///
/// Same as [`generate_token`].
#[instrument(skip_all, fields(role = tracing::field::Empty))]
pub fn generate_token_at(
    session: &Session,
    options: &TokenOptions,
    now: i64,
    nonce: i32,
) -> Result<String, OpenTokError> {
    let role = options.role.unwrap_or_default();
    tracing::Span::current().record("role", role.as_str());

    let result = build_token(session, options, role, now, nonce);
    match &result {
        Ok(_) => {
            record_token_generation(role.as_str(), "success");
            debug!(target: "opentok.token", "Token generated");
        }
        Err(e) => {
            record_token_generation(role.as_str(), e.category());
            debug!(target: "opentok.token", error = %e, "Token generation rejected");
        }
    }
    result
}

fn build_token(
    session: &Session,
    options: &TokenOptions,
    role: Role,
    now: i64,
    nonce: i32,
) -> Result<String, OpenTokError> {
    let expire_time = resolve_expire_time(options.expire_time, now)?;
    let connection_data = validate_connection_data(options.connection_data.as_deref())?;

    let data = data_string(
        session.session_id(),
        now,
        nonce,
        role,
        expire_time,
        connection_data,
    );
    let sig = crypto::sign(data.as_bytes(), session.api_secret())?;

    Ok(encode_envelope(session.api_key(), &sig, &data))
}

fn resolve_expire_time(requested: Option<i64>, now: i64) -> Result<i64, OpenTokError> {
    let earliest = now.saturating_sub(EXPIRY_TOLERANCE_SECS);
    let latest = now.saturating_add(MAX_TOKEN_TTL_SECS);

    match requested {
        None | Some(0) => Ok(now.saturating_add(DEFAULT_TOKEN_TTL_SECS)),
        Some(expire_time) if expire_time < earliest => {
            Err(OpenTokError::InvalidArgument(format!(
                "Expire time must be in the future. relative time: {}",
                expire_time.saturating_sub(now)
            )))
        }
        Some(expire_time) if expire_time > latest => {
            Err(OpenTokError::InvalidArgument(format!(
                "Expire time must be in the next 30 days. too large by {}",
                expire_time.saturating_sub(latest)
            )))
        }
        Some(expire_time) => Ok(expire_time),
    }
}

/// Returns the data to embed, or `None` when there is nothing to embed.
fn validate_connection_data(data: Option<&str>) -> Result<Option<&str>, OpenTokError> {
    let Some(data) = data else {
        return Ok(None);
    };
    let length = data.encode_utf16().count();
    if length > MAX_CONNECTION_DATA_LENGTH {
        return Err(OpenTokError::InvalidArgument(format!(
            "Connection data must be less than {MAX_CONNECTION_DATA_LENGTH} characters. length: {length}"
        )));
    }
    Ok(if data.is_empty() { None } else { Some(data) })
}

fn data_string(
    session_id: &str,
    create_time: i64,
    nonce: i32,
    role: Role,
    expire_time: i64,
    connection_data: Option<&str>,
) -> String {
    let mut data = format!(
        "session_id={session_id}&create_time={create_time}&nonce={nonce}&role={role}&expire_time={expire_time}"
    );
    if let Some(connection_data) = connection_data {
        data.push_str("&connection_data=");
        data.extend(form_urlencoded::byte_serialize(connection_data.as_bytes()));
    }
    data
}

fn encode_envelope(api_key: u32, sig: &str, data: &str) -> String {
    let inner = format!("partner_id={api_key}&sig={sig}:{data}");
    format!("{TOKEN_SENTINEL}{}", URL_SAFE_NO_PAD.encode(inner.as_bytes()))
}

// =============================================================================
// Decoding
// =============================================================================

/// Fields carried in a token's data string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    /// Session the token grants access to.
    pub session_id: String,
    /// Seconds since the epoch when the token was signed.
    pub create_time: i64,
    /// Random value distinguishing tokens signed in the same second.
    pub nonce: i32,
    /// Role granted.
    pub role: Role,
    /// Seconds since the epoch when the token stops being accepted.
    pub expire_time: i64,
    /// Decoded connection data, if any was embedded.
    pub connection_data: Option<String>,
}

impl TokenData {
    fn parse(data: &str) -> Result<Self, OpenTokError> {
        let mut pairs = form_urlencoded::parse(data.as_bytes());

        let session_id = next_field(&mut pairs, "session_id")?;
        let create_time = parse_int(&next_field(&mut pairs, "create_time")?, "create_time")?;
        let nonce = parse_int(&next_field(&mut pairs, "nonce")?, "nonce")?;
        let role = next_field(&mut pairs, "role")?.parse::<Role>()?;
        let expire_time = parse_int(&next_field(&mut pairs, "expire_time")?, "expire_time")?;

        let connection_data = match pairs.next() {
            None => None,
            Some((key, value)) if key == "connection_data" => Some(value.into_owned()),
            Some((key, _)) => {
                return Err(malformed(format!("unexpected field '{key}'")));
            }
        };
        if let Some((key, _)) = pairs.next() {
            return Err(malformed(format!("unexpected field '{key}'")));
        }

        Ok(Self {
            session_id,
            create_time,
            nonce,
            role,
            expire_time,
            connection_data,
        })
    }
}

/// A token split back into its envelope and data fields.
///
/// This is the path a verifier takes: strip the sentinel, decode, split on
/// the first `:`, then check `sig` against the raw data string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    /// Account key from the envelope.
    pub partner_id: u32,
    /// Hex signature from the envelope.
    pub signature: String,
    /// Parsed data fields.
    pub data: TokenData,
    data_string: String,
}

impl DecodedToken {
    /// Decode a `T1==` token.
    ///
    /// # Errors
    ///
    /// Returns `OpenTokError::InvalidArgument` if the token is malformed.
    pub fn parse(token: &str) -> Result<Self, OpenTokError> {
        let encoded = token
            .strip_prefix(TOKEN_SENTINEL)
            .ok_or_else(|| malformed(format!("missing {TOKEN_SENTINEL} prefix")))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| malformed(format!("base64 decode failed: {e}")))?;
        let inner =
            String::from_utf8(bytes).map_err(|e| malformed(format!("not UTF-8: {e}")))?;

        let (envelope, data_string) = inner
            .split_once(':')
            .ok_or_else(|| malformed("missing ':' separator".to_string()))?;

        let mut pairs = form_urlencoded::parse(envelope.as_bytes());
        let partner_id = parse_int(&next_field(&mut pairs, "partner_id")?, "partner_id")?;
        let signature = next_field(&mut pairs, "sig")?;

        let data = TokenData::parse(data_string)?;

        Ok(Self {
            partner_id,
            signature,
            data,
            data_string: data_string.to_string(),
        })
    }

    /// The signed data string exactly as it appeared in the token.
    #[must_use]
    pub fn data_string(&self) -> &str {
        &self.data_string
    }

    /// Recompute the signature with `secret` and compare in constant time.
    #[must_use]
    pub fn verify(&self, secret: &SecretString) -> bool {
        crypto::verify(self.data_string.as_bytes(), secret, &self.signature)
    }
}

fn next_field<'a>(
    pairs: &mut impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>,
    expected: &str,
) -> Result<String, OpenTokError> {
    match pairs.next() {
        Some((key, value)) if key == expected => Ok(value.into_owned()),
        Some((key, _)) => Err(malformed(format!(
            "expected field '{expected}', found '{key}'"
        ))),
        None => Err(malformed(format!("missing field '{expected}'"))),
    }
}

fn parse_int<T: FromStr>(value: &str, field: &str) -> Result<T, OpenTokError> {
    value
        .parse()
        .map_err(|_| malformed(format!("field '{field}' is not an integer: {value}")))
}

fn malformed(reason: String) -> OpenTokError {
    OpenTokError::InvalidArgument(format!("Malformed token: {reason}"))
}
