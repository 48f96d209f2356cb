//! # OpenTok Test Utilities
//!
//! Shared test utilities for the OpenTok client.
//!
//! This crate provides:
//! - Fixed credentials and ids (deterministic tokens)
//! - Session, config and client fixtures
//! - wiremock stubs for the session and archive endpoints
//! - Custom assertions on token strings (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use opentok_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let server = wiremock::MockServer::start().await;
//!     mount_create_session(&server, TEST_SESSION_ID).await;
//!
//!     let client = test_client(&server.uri());
//!     let session = client.create_session(&Default::default()).await?;
//!
//!     session
//!         .generate_default_token()?
//!         .assert_valid_token()
//!         .assert_role(Role::Publisher)
//!         .assert_signed_with(TEST_API_SECRET);
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock_api;
pub mod test_ids;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;
pub use mock_api::*;
pub use test_ids::*;
