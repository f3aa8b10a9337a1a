//! # Binlog Streamer
//!
//! Row-level change streaming from a MySQL binary log, for online schema
//! migration appliers.
//!
//! ## Architecture
//!
//! The streamer sits between an external binlog protocol client and a
//! downstream applier, turning raw replication events into ordered change
//! records:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │                             binlog-streamer                               │
//! │                                                                           │
//! │  ┌──────────────┐    ┌──────────────┐    ┌─────────────┐    ┌──────────┐  │
//! │  │ BinlogSyncer │───►│ BinlogReader │───►│ ReplayGuard │───►│ Decoder  │  │
//! │  │ (client)     │    │ (stream loop)│    │ (dedup)     │    │ (rows)   │  │
//! │  └──────────────┘    └──────────────┘    └─────────────┘    └──────────┘  │
//! │         │                   │                                    │        │
//! │         ▼                   ▼                                    ▼        │
//! │  ┌──────────────┐    ┌───────────────────┐              ┌──────────────┐  │
//! │  │ AuthCircuit  │    │ CoordinatesHandle │              │ bounded mpsc │──┼──► applier
//! │  │ Breaker      │    │ (shared position) │              │ BinlogEntry  │  │
//! │  └──────────────┘    └───────────────────┘              └──────────────┘  │
//! └───────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! 1. **Ordering**: entries are emitted in log order, rows within an event in row order
//! 2. **No replay**: a rows event at or before the last-applied hint is never re-emitted
//! 3. **Backpressure**: the loop blocks on the bounded hand-off until the applier catches up
//! 4. **Fail fast**: position overflow and malformed rows are fatal, never auto-corrected
//!
//! ## Usage
//!
//! ```rust,no_run
//! use binlog_streamer::{BinlogCoordinates, BinlogReader, BinlogSyncer, ReaderConfig};
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! async fn run<S: BinlogSyncer>(syncer: S, stop: Arc<AtomicBool>) -> binlog_streamer::Result<()> {
//!     let config = ReaderConfig::default();
//!     let (tx, mut rx) = config.entries_channel();
//!
//!     let mut reader = BinlogReader::new(config, syncer);
//!     reader.connect(BinlogCoordinates::new("mysql-bin.000001", 4)).await?;
//!
//!     let applier = tokio::spawn(async move {
//!         while let Some(entry) = rx.recv().await {
//!             println!("{}", entry);
//!         }
//!     });
//!
//!     let result = reader.stream_events(|| stop.load(Ordering::Relaxed), &tx).await;
//!     reader.close();
//!     drop(tx);
//!     let _ = applier.await;
//!     result
//! }
//! ```

pub mod circuit_breaker;
pub mod client;
pub mod config;
pub mod coordinates;
pub mod decoder;
pub mod entry;
pub mod error;
pub mod metrics;
pub mod reader;
pub mod replay;

// Re-exports for convenience
pub use circuit_breaker::{is_authentication_error, AuthCircuitBreaker, BreakerState};
pub use client::{
    BinlogPosition, BinlogStreamer, BinlogSyncer, BinlogSyncerConfig, ClientError, EventType, MySqlError,
    RawEvent,
};
pub use config::{ConnectionConfig, ReaderConfig, TlsConfig};
pub use coordinates::{BinlogCoordinates, CoordinatesHandle};
pub use entry::{BinlogDmlEvent, BinlogEntry, ColumnValue, ColumnValues, EventDml};
pub use error::{BinlogError, DecodeError, Result};
pub use reader::BinlogReader;
pub use replay::ReplayGuard;
