// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Binlog coordinates and the shared "current position" cell.
//!
//! A [`BinlogCoordinates`] names an exact point in the source's binary log:
//! a file (`mysql-bin.000042`) and a byte offset inside it. The stream loop
//! advances a single current coordinate as it reads events; a status reporter
//! running elsewhere may snapshot it at any time through a [`CoordinatesHandle`].
//!
//! # Ordering
//!
//! Coordinates order by file name first (rotation boundary), then by position.
//! `event_size` is carried along for overflow detection but takes no part in
//! ordering or equality.
//!
//! ```text
//! mysql-bin.000001:4  <  mysql-bin.000001:500  <  mysql-bin.000002:4
//! ```
//!
//! # 4-byte positions
//!
//! The `end_log_pos` field of a binlog event header is a `u32`. A binlog file
//! that grows past 4GiB wraps it, and positions then compare as if they went
//! backwards. See [`BinlogCoordinates::is_log_pos_overflow_beyond_4_bytes`].

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Largest value representable by a binlog header position, plus one.
pub const LOG_POS_4_BYTE_LIMIT: i64 = 1 << 32;

/// A position in the binary log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BinlogCoordinates {
    /// Binlog file name, e.g. `mysql-bin.000042`.
    pub log_file: String,
    /// Byte offset of the end of the last event read in `log_file`.
    pub log_pos: i64,
    /// Size in bytes of the last event read.
    #[serde(default)]
    pub event_size: i64,
}

impl BinlogCoordinates {
    /// Create coordinates at `log_file:log_pos` with no event size.
    pub fn new(log_file: impl Into<String>, log_pos: i64) -> Self {
        Self {
            log_file: log_file.into(),
            log_pos,
            event_size: 0,
        }
    }

    /// Unset coordinates have no log file.
    pub fn is_empty(&self) -> bool {
        self.log_file.is_empty()
    }

    /// `self < other` in (file, position) order.
    pub fn smaller_than(&self, other: &BinlogCoordinates) -> bool {
        self.cmp(other) == Ordering::Less
    }

    /// `self <= other` in (file, position) order.
    pub fn smaller_than_or_equals(&self, other: &BinlogCoordinates) -> bool {
        self.cmp(other) != Ordering::Greater
    }

    /// Numeric suffix of the log file name (`mysql-bin.000042` -> 42).
    ///
    /// Returns `None` when the name has no `.`-separated numeric suffix.
    pub fn file_number(&self) -> Option<u64> {
        let (_, suffix) = self.log_file.rsplit_once('.')?;
        suffix.parse().ok()
    }

    /// Detect a header position that wrapped past 4 bytes without a rotation.
    ///
    /// `previous` is the coordinate of the last fully applied rows event. If it
    /// is set, lives in the same file, and `previous.log_pos + self.event_size`
    /// reaches `2^32`, then the current header position cannot be trusted.
    pub fn is_log_pos_overflow_beyond_4_bytes(&self, previous: &BinlogCoordinates) -> bool {
        if previous.is_empty() {
            return false;
        }
        if self.log_file != previous.log_file {
            return false;
        }
        previous.log_pos.saturating_add(self.event_size) >= LOG_POS_4_BYTE_LIMIT
    }
}

impl PartialEq for BinlogCoordinates {
    fn eq(&self, other: &Self) -> bool {
        self.log_file == other.log_file && self.log_pos == other.log_pos
    }
}

impl Eq for BinlogCoordinates {}

impl PartialOrd for BinlogCoordinates {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BinlogCoordinates {
    fn cmp(&self, other: &Self) -> Ordering {
        self.log_file
            .cmp(&other.log_file)
            .then(self.log_pos.cmp(&other.log_pos))
    }
}

impl fmt::Display for BinlogCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.log_file, self.log_pos)
    }
}

/// Lock-guarded current coordinate, shared between the stream loop (single
/// writer) and any number of readers.
///
/// Cloning the handle is cheap and shares the underlying cell.
#[derive(Debug, Clone, Default)]
pub struct CoordinatesHandle {
    inner: Arc<Mutex<BinlogCoordinates>>,
}

impl CoordinatesHandle {
    /// Create a handle holding `coordinates`.
    pub fn new(coordinates: BinlogCoordinates) -> Self {
        Self {
            inner: Arc::new(Mutex::new(coordinates)),
        }
    }

    /// Copy of the current coordinate.
    pub fn snapshot(&self) -> BinlogCoordinates {
        self.inner.lock().clone()
    }

    /// Replace the whole coordinate.
    pub fn set(&self, coordinates: BinlogCoordinates) {
        *self.inner.lock() = coordinates;
    }

    /// Record the position and size of the event just read.
    pub fn advance(&self, log_pos: i64, event_size: i64) {
        let mut current = self.inner.lock();
        current.log_pos = log_pos;
        current.event_size = event_size;
    }

    /// Switch to a new log file, returning the file we rotated away from.
    pub fn rotate(&self, next_log_file: impl Into<String>) -> String {
        let mut current = self.inner.lock();
        std::mem::replace(&mut current.log_file, next_log_file.into())
    }
}
