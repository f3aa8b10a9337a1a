// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types for the binlog streamer.
//!
//! The streamer never retries on its own. Every failure is returned to the
//! caller with enough structure to decide what to do next.
//!
//! # Error Categories
//!
//! | Error Type | Retryable | Description |
//! |------------|-----------|-------------|
//! | `Client` | Yes | Transient client failure, or an auth failure below the breaker limit |
//! | `AuthCircuitTripped` | No | Too many consecutive auth failures; abort the migration |
//! | `EmptyCoordinates` | No | Streaming requested without a start position |
//! | `LogPosOverflow` | No | Header position wrapped past 4 bytes; positions are untrustworthy |
//! | `Decode` | No | Malformed or unrecognized rows event |
//! | `NotConnected` | No | `stream_events` called before `connect` |
//! | `ConsumerGone` | No | The entries receiver was dropped |
//! | `Config` | No | Configuration invalid |
//!
//! # Retry Behavior
//!
//! Use [`BinlogError::is_retryable()`] to decide whether reconnecting from the
//! last reported coordinate makes sense. A tripped auth breaker is explicitly
//! not retryable: hammering a host with bad credentials risks a network-level
//! block.

use crate::client::{ClientError, EventType};
use crate::coordinates::BinlogCoordinates;
use thiserror::Error;

/// Result type alias for streamer operations.
pub type Result<T> = std::result::Result<T, BinlogError>;

/// Malformed rows event payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The event carries rows but is not a write/update/delete event.
    #[error("Unknown DML type: {event_type}")]
    UnknownDml { event_type: EventType },

    /// An update event must carry (before, after) pairs.
    #[error("update rows event on {schema}.{table} has {rows} rows; expected before/after pairs")]
    UnpairedUpdateRows {
        schema: String,
        table: String,
        rows: usize,
    },
}

/// Errors that can occur while streaming the binlog.
#[derive(Error, Debug)]
pub enum BinlogError {
    /// No start position was supplied.
    #[error("Empty coordinates at connect")]
    EmptyCoordinates,

    /// The binlog position does not fit the protocol's 4-byte field, or wrapped.
    #[error("Unexpected binlog position {coordinates}, the binlog end_log_pos is overflow 4 bytes")]
    LogPosOverflow { coordinates: BinlogCoordinates },

    /// Rows event could not be turned into mutations.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error from the binlog client, passed through for the caller's retry policy.
    #[error("binlog client error during {context}: {source}")]
    Client {
        context: String,
        #[source]
        source: ClientError,
    },

    /// Consecutive auth failures reached the configured maximum.
    #[error(
        "authentication failed {failures} times (max: {max}) during {context}, aborting to prevent firewall blocking: {source}"
    )]
    AuthCircuitTripped {
        failures: u32,
        max: u32,
        context: String,
        #[source]
        source: ClientError,
    },

    /// `stream_events` was called without an open session.
    #[error("binlog streamer is not connected")]
    NotConnected,

    /// The receiving side of the entries channel was dropped.
    #[error("entries channel closed by consumer")]
    ConsumerGone,

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BinlogError {
    /// Wrap a client error with the operation it interrupted.
    pub fn client(context: impl Into<String>, source: ClientError) -> Self {
        Self::Client {
            context: context.into(),
            source,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Client { .. } => true,
            Self::AuthCircuitTripped { .. } => false, // Must abort, not reconnect
            Self::EmptyCoordinates => false,
            Self::LogPosOverflow { .. } => false, // Never auto-resync
            Self::Decode(_) => false,
            Self::NotConnected => false,
            Self::ConsumerGone => false,
            Self::Config(_) => false,
        }
    }

    /// Check if this is the breaker's abort signal.
    pub fn is_auth_circuit_tripped(&self) -> bool {
        matches!(self, Self::AuthCircuitTripped { .. })
    }

    /// The underlying client error, if any.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client { source, .. } | Self::AuthCircuitTripped { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MySqlError;

    #[test]
    fn test_is_retryable_client() {
        let err = BinlogError::client("streaming", ClientError::Other("connection reset".into()));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("streaming"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_not_retryable_tripped() {
        let err = BinlogError::AuthCircuitTripped {
            failures: 3,
            max: 3,
            context: "connection".into(),
            source: MySqlError::new(1045, "Access denied").into(),
        };
        assert!(!err.is_retryable());
        assert!(err.is_auth_circuit_tripped());

        let msg = err.to_string();
        assert!(msg.contains("authentication failed 3 times (max: 3)"));
        assert!(msg.contains("during connection"));
        assert!(msg.contains("Access denied"));
    }

    #[test]
    fn test_not_retryable_empty_coordinates() {
        let err = BinlogError::EmptyCoordinates;
        assert!(!err.is_retryable());
        assert!(!err.is_auth_circuit_tripped());
    }

    #[test]
    fn test_not_retryable_overflow() {
        let err = BinlogError::LogPosOverflow {
            coordinates: BinlogCoordinates::new("mysql-bin.000001", 12),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("mysql-bin.000001:12"));
        assert!(err.to_string().contains("overflow 4 bytes"));
    }

    #[test]
    fn test_not_retryable_decode() {
        let err: BinlogError = DecodeError::UnknownDml {
            event_type: EventType::PartialUpdateRowsEvent,
        }
        .into();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("Unknown DML type: PartialUpdateRowsEvent"));
    }

    #[test]
    fn test_decode_unpaired_message() {
        let err = DecodeError::UnpairedUpdateRows {
            schema: "shop".into(),
            table: "orders".into(),
            rows: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("shop.orders"));
        assert!(msg.contains("3 rows"));
    }

    #[test]
    fn test_not_retryable_misc() {
        assert!(!BinlogError::NotConnected.is_retryable());
        assert!(!BinlogError::ConsumerGone.is_retryable());
        assert!(!BinlogError::Config("bad".into()).is_retryable());
    }

    #[test]
    fn test_client_error_accessor() {
        let err = BinlogError::client("connection", MySqlError::new(1130, "Host not allowed").into());
        assert_eq!(err.client_error().and_then(|e| e.server_error()).map(|e| e.code), Some(1130));
        assert!(BinlogError::EmptyCoordinates.client_error().is_none());
    }

    #[test]
    fn test_source_chain_exposes_client_error() {
        use std::error::Error;

        let err = BinlogError::client("streaming", MySqlError::new(1045, "denied").into());
        let source = err.source().expect("client error has a source");
        assert!(source.downcast_ref::<ClientError>().is_some());
    }
}
