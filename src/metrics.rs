//! Metrics for observability.
//!
//! Exports Prometheus-compatible metrics for:
//! - Events read from the binlog, by type
//! - File rotations and current position
//! - Rows events skipped by replay protection
//! - Entries handed off, and how long the hand-off blocked
//! - Authentication failures, breaker trips and recoveries
//!
//! # Metric Naming Convention
//!
//! All metrics are prefixed with `binlog_` and follow Prometheus conventions:
//! - Counters end in `_total`
//! - Gauges represent current state
//! - Histograms track distributions (duration)
//!
//! # Usage
//!
//! ```rust,no_run
//! use binlog_streamer::metrics;
//! use std::time::Duration;
//!
//! metrics::record_event_read("WriteRowsEventV2");
//! metrics::record_send_wait(Duration::from_millis(3));
//! ```

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record one event pulled from the client.
pub fn record_event_read(event_type: &str) {
    counter!("binlog_events_read_total", "event_type" => event_type.to_string()).increment(1);
}

/// Record a rotation into a new binlog file.
pub fn record_rotation() {
    counter!("binlog_rotations_total").increment(1);
}

/// Record a rows event skipped as already applied.
pub fn record_rows_event_skipped() {
    counter!("binlog_rows_events_skipped_total").increment(1);
}

/// Record entries handed to the consumer.
pub fn record_entries_emitted(dml: &str, count: usize) {
    counter!("binlog_entries_emitted_total", "dml" => dml.to_string()).increment(count as u64);
}

/// Record how long a hand-off send waited for the consumer.
pub fn record_send_wait(duration: Duration) {
    histogram!("binlog_send_wait_seconds").record(duration.as_secs_f64());
}

/// Record the current read position within the current file.
pub fn set_log_pos(log_pos: i64) {
    gauge!("binlog_log_pos").set(log_pos as f64);
}

/// Record an authentication failure.
pub fn record_auth_failure(context: &str) {
    counter!("binlog_auth_failures_total", "context" => context.to_string()).increment(1);
}

/// Record the auth breaker tripping.
pub fn record_auth_circuit_trip(context: &str) {
    counter!("binlog_auth_circuit_trips_total", "context" => context.to_string()).increment(1);
}

/// Record a success that ended an auth failure streak.
pub fn record_auth_recovery(context: &str) {
    counter!("binlog_auth_recoveries_total", "context" => context.to_string()).increment(1);
}

/// Record an error by type.
pub fn record_error(error_type: &str) {
    counter!("binlog_errors_total", "error_type" => error_type.to_string()).increment(1);
}
