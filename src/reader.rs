// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Binlog reader: connection lifecycle and the stream loop.
//!
//! # Flow
//!
//! ```text
//! connect(coords) ──► start_sync ──► session
//!                                       │
//! stream_events(can_stop, tx)           ▼
//!   loop ── can_stop? ──► get_event ──► advance position
//!                                       │
//!                 ┌─────────────────────┼──────────────┐
//!                 ▼                     ▼              ▼
//!              Rotate                 Rows           other
//!          switch log file     overflow? dup? ──►    ignored
//!                              decode ──► tx.send(entry)
//!                              mark applied
//! ```
//!
//! # Suspension Points
//!
//! Exactly two: waiting for the next event from the client, and waiting for
//! the consumer to accept an entry. The hand-off is bounded, so the loop is
//! never more than the channel capacity ahead of the applier.
//!
//! # Cancellation
//!
//! `can_stop` is polled before the first fetch and at the top of every
//! iteration. A fetch already in flight completes (or errors) before the stop
//! is noticed. Dropping the `stream_events` future also stops the loop.
//!
//! # Errors
//!
//! Client failures go through the [`AuthCircuitBreaker`] and are returned to
//! the caller, ending the loop. The reader never reconnects on its own.

use crate::circuit_breaker::AuthCircuitBreaker;
use crate::client::{BinlogPosition, BinlogStreamer, BinlogSyncer, EventBody, EventType, RotateEvent, RowsEvent};
use crate::config::ReaderConfig;
use crate::coordinates::{BinlogCoordinates, CoordinatesHandle};
use crate::decoder;
use crate::entry::BinlogEntry;
use crate::error::{BinlogError, Result};
use crate::metrics;
use crate::replay::ReplayGuard;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, trace, Instrument};

/// Streams row mutations from a MySQL binlog.
pub struct BinlogReader<S: BinlogSyncer> {
    config: ReaderConfig,
    syncer: S,
    streamer: Option<S::Streamer>,
    /// Shared with status reporters; the loop is the only writer.
    coordinates: CoordinatesHandle,
    replay: ReplayGuard,
    breaker: AuthCircuitBreaker,
}

impl<S: BinlogSyncer> BinlogReader<S> {
    /// Create a reader over `syncer`. Nothing is opened until [`connect`](Self::connect).
    pub fn new(config: ReaderConfig, syncer: S) -> Self {
        let breaker = AuthCircuitBreaker::new(config.max_auth_failures);
        Self {
            config,
            syncer,
            streamer: None,
            coordinates: CoordinatesHandle::default(),
            replay: ReplayGuard::new(),
            breaker,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Open a replication session starting at `coordinates`.
    ///
    /// The outcome of `start_sync` is recorded by the auth breaker under the
    /// `"connection"` context.
    pub async fn connect(&mut self, coordinates: BinlogCoordinates) -> Result<()> {
        if coordinates.is_empty() {
            return Err(BinlogError::EmptyCoordinates);
        }
        let position = BinlogPosition::from_coordinates(&coordinates).ok_or_else(|| {
            BinlogError::LogPosOverflow {
                coordinates: coordinates.clone(),
            }
        })?;

        self.coordinates.set(coordinates.clone());
        info!(
            coordinates = %coordinates,
            host = %self.config.connection.address(),
            server_id = self.config.replica_server_id,
            "Connecting binlog streamer"
        );

        let started = self.syncer.start_sync(position).await;
        let streamer = self.breaker.handle(started, "connection")?;
        self.streamer = Some(streamer);
        Ok(())
    }

    /// Whether a session is open.
    pub fn is_connected(&self) -> bool {
        self.streamer.is_some()
    }

    /// Snapshot of the current read position.
    pub fn current_coordinates(&self) -> BinlogCoordinates {
        self.coordinates.snapshot()
    }

    /// Handle for reading the position from another task while streaming.
    pub fn coordinates_handle(&self) -> CoordinatesHandle {
        self.coordinates.clone()
    }

    /// The last fully emitted rows-event coordinate.
    pub fn last_applied_hint(&self) -> &BinlogCoordinates {
        self.replay.hint()
    }

    /// Seed replay protection, e.g. with the hint from a previous session.
    pub fn set_last_applied_hint(&mut self, hint: BinlogCoordinates) {
        self.replay.set_hint(hint);
    }

    pub fn auth_breaker(&self) -> &AuthCircuitBreaker {
        &self.breaker
    }

    /// Pull events and hand row mutations to `entries` until `can_stop` returns true.
    ///
    /// Returns `Ok(())` on cooperative stop. Any client error ends the loop
    /// and is returned after classification by the auth breaker.
    pub async fn stream_events<F>(&mut self, can_stop: F, entries: &mpsc::Sender<BinlogEntry>) -> Result<()>
    where
        F: Fn() -> bool,
    {
        if can_stop() {
            return Ok(());
        }
        if self.streamer.is_none() {
            return Err(BinlogError::NotConnected);
        }

        let span = info_span!("binlog_stream", file = %self.coordinates.snapshot().log_file);
        self.stream_loop(can_stop, entries).instrument(span).await
    }

    async fn stream_loop<F>(&mut self, can_stop: F, entries: &mpsc::Sender<BinlogEntry>) -> Result<()>
    where
        F: Fn() -> bool,
    {
        loop {
            if can_stop() {
                break;
            }

            let fetched = match self.streamer.as_mut() {
                Some(streamer) => streamer.get_event().await,
                None => return Err(BinlogError::NotConnected),
            };
            let event = match fetched {
                Ok(event) => event,
                Err(err) => {
                    metrics::record_error("client");
                    return Err(self.breaker.record_failure(err, "streaming"));
                }
            };
            self.breaker.record_success("event retrieval");

            let header = event.header;
            metrics::record_event_read(&header.event_type.to_string());
            self.coordinates
                .advance(i64::from(header.log_pos), i64::from(header.event_size));
            metrics::set_log_pos(i64::from(header.log_pos));

            match event.body {
                EventBody::Rotate(rotate) => self.handle_rotate(rotate),
                EventBody::Rows(rows) => {
                    self.handle_rows_event(header.event_type, rows, entries).await?;
                }
                EventBody::Other => {
                    trace!(event_type = %header.event_type, "Ignoring event");
                }
            }
        }

        debug!("done streaming events");
        Ok(())
    }

    fn handle_rotate(&mut self, rotate: RotateEvent) {
        let previous = self.coordinates.rotate(rotate.next_log_name.clone());
        info!(
            from = %previous,
            to = %rotate.next_log_name,
            position = rotate.position,
            "rotate to next log from {} to {}",
            previous,
            rotate.next_log_name
        );
        metrics::record_rotation();
    }

    async fn handle_rows_event(
        &mut self,
        event_type: EventType,
        rows: RowsEvent,
        entries: &mpsc::Sender<BinlogEntry>,
    ) -> Result<()> {
        let current = self.coordinates.snapshot();

        if self.replay.is_overflow(&current) {
            metrics::record_error("log_pos_overflow");
            return Err(BinlogError::LogPosOverflow { coordinates: current });
        }

        if self.replay.is_duplicate(&current) {
            debug!(
                coordinates = %current,
                hint = %self.replay.hint(),
                "Skipping handled query"
            );
            metrics::record_rows_event_skipped();
            return Ok(());
        }

        let dml = decoder::dml_for(event_type).inspect_err(|_| metrics::record_error("decode"))?;
        let mutations = decoder::decode_rows(dml, rows).inspect_err(|_| metrics::record_error("decode"))?;

        let mut emitted = 0usize;
        for mutation in mutations {
            let entry = BinlogEntry::new(current.clone(), mutation);
            trace!(entry = %entry, "Handing off entry");

            let wait_start = Instant::now();
            entries
                .send(entry)
                .await
                .map_err(|_| BinlogError::ConsumerGone)?;
            metrics::record_send_wait(wait_start.elapsed());
            emitted += 1;
        }
        metrics::record_entries_emitted(dml.as_str(), emitted);

        self.replay.mark_applied(current);
        Ok(())
    }

    /// Release the underlying connection. Safe to call more than once.
    pub fn close(&mut self) {
        let had_session = self.streamer.take().is_some();
        self.syncer.close();
        if had_session {
            info!(coordinates = %self.coordinates.snapshot(), "Closed binlog streamer");
        }
    }
}
