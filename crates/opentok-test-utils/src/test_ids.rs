//! Fixed test credentials and ids
//!
//! All values are deterministic so that tokens signed with a fixed clock and
//! nonce are reproducible across runs.

use uuid::Uuid;

// Partner credentials
pub const TEST_API_KEY: u32 = 123_456;
pub const TEST_API_SECRET: &str = "1234567890abcdef1234567890abcdef1234567890";

// A second account, for mismatched-credential tests
pub const OTHER_API_KEY: u32 = 654_321;
pub const OTHER_API_SECRET: &str = "fedcba0987654321fedcba0987654321fedcba0987";

// Session ids
pub const TEST_SESSION_ID: &str = "1_MX4xMjM0NTZ-abc";
pub const TEST_SESSION_ID_LONG: &str =
    "1_MX4xMjM0NTZ-fk1vbiBNYXIgMTcgMDA6NDE6MzEgUERUIDIwMTR-MC42ODM3ODk1MzQ0OTQyODA4fg";

// Archive ids
pub const TEST_ARCHIVE_ID: Uuid = Uuid::from_u128(0x30b3_ebf1_ba36_4f5b_8def_6f70_d998_6fe9);
pub const TEST_ARCHIVE_ID_2: Uuid = Uuid::from_u128(2);

// Fixed clock and nonce for deterministic token generation
pub const TEST_NOW: i64 = 1_700_000_000;
pub const TEST_NONCE: i32 = 42;
