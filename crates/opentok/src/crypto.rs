//! HMAC-SHA1 signing for the token envelope.
//!
//! The service verifies `sig` with HMAC-SHA1 keyed by the account secret,
//! so SHA-1 is fixed by the wire format. `ring` exposes it only as
//! `HMAC_SHA1_FOR_LEGACY_USE_ONLY`, which is the exact use here.

use crate::error::OpenTokError;
use crate::secret::{ExposeSecret, SecretString};
use ring::hmac;

/// Length of a hex-encoded HMAC-SHA1 tag.
pub const SIGNATURE_HEX_LEN: usize = 40;

/// HMAC accepts an empty key, but no account has an empty secret, so one
/// is refused here rather than producing a token the service will reject.
fn signing_key(secret: &SecretString) -> Result<hmac::Key, OpenTokError> {
    let key_bytes = secret.expose_secret().as_bytes();
    if key_bytes.is_empty() {
        return Err(OpenTokError::Signing("signing key is empty".to_string()));
    }
    Ok(hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key_bytes))
}

/// Sign `message` with the account secret.
///
/// Returns the tag as lowercase hex.
///
/// # Errors
///
/// Returns `OpenTokError::Signing` if the secret is empty. This is a policy
/// check on the credentials; the HMAC primitive itself cannot fail.
pub fn sign(message: &[u8], secret: &SecretString) -> Result<String, OpenTokError> {
    let key = signing_key(secret)?;
    let tag = hmac::sign(&key, message);
    Ok(hex::encode(tag.as_ref()))
}

/// Check a hex signature against `message` in constant time.
///
/// Malformed hex or an unusable secret count as a mismatch.
#[must_use]
pub fn verify(message: &[u8], secret: &SecretString, signature_hex: &str) -> bool {
    let Ok(key) = signing_key(secret) else {
        return false;
    };
    let Ok(provided) = hex::decode(signature_hex) else {
        return false;
    };
    hmac::verify(&key, message, &provided).is_ok()
}
