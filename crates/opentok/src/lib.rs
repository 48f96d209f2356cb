//! Server-side library for the OpenTok video session service.
//!
//! Creates sessions, signs the `T1==` tokens clients use to join them and
//! drives the archive (recording) REST API.

#![warn(clippy::pedantic)]

/// Module for the crate error type
pub mod error;

/// Module for client configuration loaded from the environment
pub mod config;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for the HMAC-SHA1 signing primitive
pub mod crypto;

/// Module for token roles, options, generation and decoding
pub mod token;

/// Module for session identity and creation properties
pub mod session;

/// Module for archive resources returned by the REST API
pub mod archive;

/// Module for the REST client
pub mod client;

/// Module for metrics emitted by the library
pub mod observability;

pub use archive::{Archive, ArchiveList, ArchiveListOptions, ArchiveStatus};
pub use client::OpenTok;
pub use config::ClientConfig;
pub use error::{OpenTokError, Result};
pub use session::{ArchiveMode, Session, SessionProperties};
pub use token::{DecodedToken, Role, TokenData, TokenOptions};
