//! Secret types for the account secret.
//!
//! Re-exports [`secrecy`] so that the API secret never shows up in `{:?}`
//! output or tracing fields. Reading the value requires an explicit
//! `expose_secret()` call, which in this crate happens in exactly two
//! places: keying the HMAC in [`crate::crypto`] and building the
//! partner-auth header in [`crate::client`].
//!
//! # Example
//!
//! ```rust
//! use opentok::secret::{ExposeSecret, SecretString};
//!
//! let secret = SecretString::from("1234567890abcdef1234567890abcdef1234567890");
//! assert!(!format!("{secret:?}").contains("1234567890abcdef"));
//! assert_eq!(secret.expose_secret().len(), 42);
//! ```

pub use secrecy::{ExposeSecret, SecretString};

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("1234567890abcdef");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("1234567890abcdef"));
    }

    #[test]
    fn test_deserialized_credentials_stay_redacted() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct Credentials {
            api_key: u32,
            api_secret: SecretString,
        }

        let json = r#"{"api_key": 123456, "api_secret": "partner-secret"}"#;
        let creds: Credentials = serde_json::from_str(json).expect("deserialize");

        assert_eq!(creds.api_secret.expose_secret(), "partner-secret");

        let debug = format!("{creds:?}");
        assert!(debug.contains("123456"));
        assert!(!debug.contains("partner-secret"));
    }
}
