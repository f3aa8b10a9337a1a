//! Shared test utilities for integration, property and chaos tests.
//!
//! This module provides:
//! - A scripted mock binlog client that records calls
//! - Raw event and error builders
//! - Stop predicates and tracing setup

#![allow(dead_code)]

pub mod mock_binlog;

pub use mock_binlog::*;

use binlog_streamer::client::{ClientError, EventType, MySqlError};
use binlog_streamer::{ColumnValue, ColumnValues, RawEvent};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const SCHEMA: &str = "shop";
pub const TABLE: &str = "orders";

/// Install a test-friendly subscriber. Honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A two-column row `(id, "row-<id>")`.
pub fn row(id: i64) -> ColumnValues {
    vec![ColumnValue::SignedInt(id), ColumnValue::String(format!("row-{}", id))].into()
}

pub fn rotate(next_log_name: &str) -> Step {
    Step::Event(RawEvent::rotate(0, next_log_name))
}

pub fn insert(log_pos: u32, ids: &[i64]) -> Step {
    rows(EventType::WriteRowsEventV2, log_pos, ids)
}

pub fn delete(log_pos: u32, ids: &[i64]) -> Step {
    rows(EventType::DeleteRowsEventV2, log_pos, ids)
}

/// Update rows are laid out before, after, before, after...
pub fn update(log_pos: u32, ids: &[i64]) -> Step {
    rows(EventType::UpdateRowsEventV2, log_pos, ids)
}

pub fn rows(event_type: EventType, log_pos: u32, ids: &[i64]) -> Step {
    Step::Event(RawEvent::rows(
        event_type,
        log_pos,
        64,
        SCHEMA,
        TABLE,
        ids.iter().copied().map(row).collect(),
    ))
}

pub fn query(log_pos: u32) -> Step {
    Step::Event(RawEvent::other(EventType::QueryEvent, log_pos, 80))
}

pub fn access_denied() -> ClientError {
    MySqlError::new(1045, "Access denied for user 'gh-ost'@'10.0.0.7' (using password: YES)")
        .with_state("28000")
        .into()
}

pub fn host_not_allowed() -> ClientError {
    MySqlError::new(1130, "Host '10.0.0.7' is not allowed to connect to this MySQL server").into()
}

pub fn connection_reset() -> ClientError {
    ClientError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "connection reset by peer",
    ))
}

/// Predicate allowing exactly `fetches` events to be pulled before stopping.
pub fn stop_after(fetches: usize) -> impl Fn() -> bool + Send + 'static {
    let calls = AtomicUsize::new(0);
    move || calls.fetch_add(1, Ordering::SeqCst) > fetches
}
