//! Observability for the OpenTok client.
//!
//! The library only emits through the `metrics` facade; installing a
//! recorder (Prometheus or otherwise) is left to the application. Without
//! one, every call is a no-op.
//!
//! Nothing recorded here carries a secret, a token or connection data.

pub mod metrics;
