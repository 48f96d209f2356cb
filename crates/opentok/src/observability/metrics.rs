//! Metrics definitions for the OpenTok client.
//!
//! All metrics follow Prometheus naming conventions:
//! - `opentok_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `role`: 3 values (subscriber, publisher, moderator)
//! - `operation`: 6 values (create_session, start_archive, stop_archive,
//!   get_archive, list_archives, delete_archive)
//! - `status`: `success` or an `OpenTokError::category` value

use metrics::{counter, histogram};
use std::time::Duration;

/// Record a token generation attempt.
///
/// Metric: `opentok_tokens_generated_total`
/// Labels: `role`, `status`
pub fn record_token_generation(role: &'static str, status: &'static str) {
    counter!("opentok_tokens_generated_total", "role" => role, "status" => status).increment(1);
}

/// Record a REST call and its latency.
///
/// Metric: `opentok_api_requests_total`, `opentok_api_request_duration_seconds`
/// Labels: `operation`, `status`
pub fn record_api_request(operation: &'static str, status: &'static str, duration: Duration) {
    histogram!("opentok_api_request_duration_seconds", "operation" => operation)
        .record(duration.as_secs_f64());

    counter!("opentok_api_requests_total", "operation" => operation, "status" => status)
        .increment(1);
}
