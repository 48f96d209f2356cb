//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for `T1==` tokens.

use opentok::secret::SecretString;
use opentok::token::TOKEN_SENTINEL;
use opentok::{DecodedToken, Role};

/// Custom assertions for generated tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_token()
///     .assert_role(Role::Moderator)
///     .assert_signed_with(TEST_API_SECRET);
/// ```
pub trait TokenAssertions {
    /// Assert that the token decodes as a well-formed `T1==` token
    fn assert_valid_token(&self) -> &Self;

    /// Assert that the signature verifies with `secret`
    fn assert_signed_with(&self, secret: &str) -> &Self;

    /// Assert that the signature does NOT verify with `secret`
    fn assert_not_signed_with(&self, secret: &str) -> &Self;

    /// Assert the account key in the envelope
    fn assert_partner(&self, api_key: u32) -> &Self;

    /// Assert the session the token grants access to
    fn assert_session(&self, session_id: &str) -> &Self;

    /// Assert the granted role
    fn assert_role(&self, role: Role) -> &Self;

    /// Assert the absolute expiry
    fn assert_expires_at(&self, expire_time: i64) -> &Self;

    /// Assert that the token expires `seconds` after it was created
    fn assert_ttl(&self, seconds: i64) -> &Self;

    /// Assert the decoded connection data (`None` means the field is absent)
    fn assert_connection_data(&self, data: Option<&str>) -> &Self;
}

fn decode(token: &str) -> DecodedToken {
    assert!(
        token.starts_with(TOKEN_SENTINEL),
        "Token must start with {TOKEN_SENTINEL}, got: {token}"
    );
    match DecodedToken::parse(token) {
        Ok(decoded) => decoded,
        Err(e) => panic!("Failed to decode token: {e}"),
    }
}

impl TokenAssertions for str {
    fn assert_valid_token(&self) -> &Self {
        let decoded = decode(self);
        assert_eq!(
            decoded.signature.len(),
            40,
            "Signature must be 40 hex characters, got {}",
            decoded.signature.len()
        );
        assert!(
            decoded
                .signature
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
            "Signature must be lowercase hex, got {}",
            decoded.signature
        );
        self
    }

    fn assert_signed_with(&self, secret: &str) -> &Self {
        let decoded = decode(self);
        assert!(
            decoded.verify(&SecretString::from(secret)),
            "Token signature does not verify with the expected secret"
        );
        self
    }

    fn assert_not_signed_with(&self, secret: &str) -> &Self {
        let decoded = decode(self);
        assert!(
            !decoded.verify(&SecretString::from(secret)),
            "Token signature unexpectedly verifies with this secret"
        );
        self
    }

    fn assert_partner(&self, api_key: u32) -> &Self {
        let decoded = decode(self);
        assert_eq!(decoded.partner_id, api_key, "Token partner_id mismatch");
        self
    }

    fn assert_session(&self, session_id: &str) -> &Self {
        let decoded = decode(self);
        assert_eq!(
            decoded.data.session_id, session_id,
            "Token session_id mismatch"
        );
        self
    }

    fn assert_role(&self, role: Role) -> &Self {
        let decoded = decode(self);
        assert_eq!(decoded.data.role, role, "Token role mismatch");
        self
    }

    fn assert_expires_at(&self, expire_time: i64) -> &Self {
        let decoded = decode(self);
        assert_eq!(
            decoded.data.expire_time, expire_time,
            "Token expire_time mismatch"
        );
        self
    }

    fn assert_ttl(&self, seconds: i64) -> &Self {
        let decoded = decode(self);
        let ttl = decoded.data.expire_time - decoded.data.create_time;
        assert_eq!(ttl, seconds, "Token lifetime mismatch");
        self
    }

    fn assert_connection_data(&self, data: Option<&str>) -> &Self {
        let decoded = decode(self);
        assert_eq!(
            decoded.data.connection_data.as_deref(),
            data,
            "Token connection_data mismatch"
        );
        self
    }
}

impl TokenAssertions for String {
    fn assert_valid_token(&self) -> &Self {
        self.as_str().assert_valid_token();
        self
    }

    fn assert_signed_with(&self, secret: &str) -> &Self {
        self.as_str().assert_signed_with(secret);
        self
    }

    fn assert_not_signed_with(&self, secret: &str) -> &Self {
        self.as_str().assert_not_signed_with(secret);
        self
    }

    fn assert_partner(&self, api_key: u32) -> &Self {
        self.as_str().assert_partner(api_key);
        self
    }

    fn assert_session(&self, session_id: &str) -> &Self {
        self.as_str().assert_session(session_id);
        self
    }

    fn assert_role(&self, role: Role) -> &Self {
        self.as_str().assert_role(role);
        self
    }

    fn assert_expires_at(&self, expire_time: i64) -> &Self {
        self.as_str().assert_expires_at(expire_time);
        self
    }

    fn assert_ttl(&self, seconds: i64) -> &Self {
        self.as_str().assert_ttl(seconds);
        self
    }

    fn assert_connection_data(&self, data: Option<&str>) -> &Self {
        self.as_str().assert_connection_data(data);
        self
    }
}
