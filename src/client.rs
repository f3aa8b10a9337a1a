// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Binlog protocol client integration traits.
//!
//! The wire protocol (handshake, TLS, packet framing, row image decoding) is
//! owned by an external binlog client library. This module defines what the
//! reader needs from it:
//!
//! 1. Start replication at a position ([`BinlogSyncer::start_sync`])
//! 2. Pull decoded events one at a time ([`BinlogStreamer::get_event`])
//! 3. Release the connection ([`BinlogSyncer::close`])
//!
//! # Example
//!
//! ```rust,no_run
//! use binlog_streamer::client::{
//!     BinlogPosition, BinlogStreamer, BinlogSyncer, BoxFuture, ClientError, RawEvent,
//! };
//!
//! struct MyStreamer;
//!
//! impl BinlogStreamer for MyStreamer {
//!     fn get_event(&mut self) -> BoxFuture<'_, RawEvent> {
//!         Box::pin(async move { Err(ClientError::Closed) })
//!     }
//! }
//!
//! struct MySyncer;
//!
//! impl BinlogSyncer for MySyncer {
//!     type Streamer = MyStreamer;
//!
//!     fn start_sync(&self, _position: BinlogPosition) -> BoxFuture<'_, MyStreamer> {
//!         Box::pin(async move { Ok(MyStreamer) })
//!     }
//!
//!     fn close(&self) {}
//! }
//! ```

use crate::config::TlsConfig;
use crate::coordinates::BinlogCoordinates;
use crate::entry::ColumnValues;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Result type for binlog client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Type alias for boxed async futures (reduces trait signature complexity).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = ClientResult<T>> + Send + 'a>>;

/// A structured error packet returned by the MySQL server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlError {
    /// Server error number, e.g. 1045.
    pub code: u16,
    /// Five-character SQLSTATE, e.g. `28000`.
    pub state: String,
    pub message: String,
}

impl MySqlError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            state: "HY000".to_string(),
            message: message.into(),
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }
}

impl fmt::Display for MySqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR {} ({}): {}", self.code, self.state, self.message)
    }
}

impl std::error::Error for MySqlError {}

/// Errors surfaced by the binlog client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with an error packet.
    #[error("{0}")]
    Server(#[from] MySqlError),

    /// Socket-level failure (reset, refused, timeout).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed underneath us.
    #[error("binlog stream closed")]
    Closed,

    /// Unstructured error text, e.g. relayed by a proxy.
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// The server error packet, if this error carries one.
    pub fn server_error(&self) -> Option<&MySqlError> {
        match self {
            ClientError::Server(e) => Some(e),
            _ => None,
        }
    }
}

/// Position handed to the server when starting replication.
///
/// The protocol carries positions as 4-byte unsigned integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinlogPosition {
    pub name: String,
    pub pos: u32,
}

impl BinlogPosition {
    /// Convert coordinates to a wire position.
    ///
    /// Returns `None` if the position does not fit in 4 bytes.
    pub fn from_coordinates(coordinates: &BinlogCoordinates) -> Option<Self> {
        let pos = u32::try_from(coordinates.log_pos).ok()?;
        Some(Self {
            name: coordinates.log_file.clone(),
            pos,
        })
    }
}

impl fmt::Display for BinlogPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.pos)
    }
}

/// Binlog event types, numbered as in the server's `Log_event_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventType {
    Unknown = 0,
    StartEventV3 = 1,
    QueryEvent = 2,
    StopEvent = 3,
    RotateEvent = 4,
    IntvarEvent = 5,
    LoadEvent = 6,
    SlaveEvent = 7,
    CreateFileEvent = 8,
    AppendBlockEvent = 9,
    ExecLoadEvent = 10,
    DeleteFileEvent = 11,
    NewLoadEvent = 12,
    RandEvent = 13,
    UserVarEvent = 14,
    FormatDescriptionEvent = 15,
    XidEvent = 16,
    BeginLoadQueryEvent = 17,
    ExecuteLoadQueryEvent = 18,
    TableMapEvent = 19,
    WriteRowsEventV0 = 20,
    UpdateRowsEventV0 = 21,
    DeleteRowsEventV0 = 22,
    WriteRowsEventV1 = 23,
    UpdateRowsEventV1 = 24,
    DeleteRowsEventV1 = 25,
    IncidentEvent = 26,
    HeartbeatEvent = 27,
    IgnorableEvent = 28,
    RowsQueryEvent = 29,
    WriteRowsEventV2 = 30,
    UpdateRowsEventV2 = 31,
    DeleteRowsEventV2 = 32,
    GtidEvent = 33,
    AnonymousGtidEvent = 34,
    PreviousGtidsEvent = 35,
    TransactionContextEvent = 36,
    ViewChangeEvent = 37,
    XaPrepareLogEvent = 38,
    PartialUpdateRowsEvent = 39,
    TransactionPayloadEvent = 40,
}

impl EventType {
    pub fn from_u8(value: u8) -> Self {
        use EventType::*;
        match value {
            1 => StartEventV3,
            2 => QueryEvent,
            3 => StopEvent,
            4 => RotateEvent,
            5 => IntvarEvent,
            6 => LoadEvent,
            7 => SlaveEvent,
            8 => CreateFileEvent,
            9 => AppendBlockEvent,
            10 => ExecLoadEvent,
            11 => DeleteFileEvent,
            12 => NewLoadEvent,
            13 => RandEvent,
            14 => UserVarEvent,
            15 => FormatDescriptionEvent,
            16 => XidEvent,
            17 => BeginLoadQueryEvent,
            18 => ExecuteLoadQueryEvent,
            19 => TableMapEvent,
            20 => WriteRowsEventV0,
            21 => UpdateRowsEventV0,
            22 => DeleteRowsEventV0,
            23 => WriteRowsEventV1,
            24 => UpdateRowsEventV1,
            25 => DeleteRowsEventV1,
            26 => IncidentEvent,
            27 => HeartbeatEvent,
            28 => IgnorableEvent,
            29 => RowsQueryEvent,
            30 => WriteRowsEventV2,
            31 => UpdateRowsEventV2,
            32 => DeleteRowsEventV2,
            33 => GtidEvent,
            34 => AnonymousGtidEvent,
            35 => PreviousGtidsEvent,
            36 => TransactionContextEvent,
            37 => ViewChangeEvent,
            38 => XaPrepareLogEvent,
            39 => PartialUpdateRowsEvent,
            40 => TransactionPayloadEvent,
            _ => Unknown,
        }
    }

    /// Row-image carrying events (the ones with a `RowsEvent` body).
    pub fn is_rows_event(&self) -> bool {
        use EventType::*;
        matches!(
            self,
            WriteRowsEventV0
                | WriteRowsEventV1
                | WriteRowsEventV2
                | UpdateRowsEventV0
                | UpdateRowsEventV1
                | UpdateRowsEventV2
                | DeleteRowsEventV0
                | DeleteRowsEventV1
                | DeleteRowsEventV2
                | PartialUpdateRowsEvent
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Common header of every binlog event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventHeader {
    pub timestamp: u32,
    pub event_type: EventType,
    pub server_id: u32,
    /// Size of the event in bytes, header included.
    pub event_size: u32,
    /// Position right after this event (`end_log_pos`).
    pub log_pos: u32,
}

impl EventHeader {
    pub fn new(event_type: EventType, log_pos: u32, event_size: u32) -> Self {
        Self {
            timestamp: 0,
            event_type,
            server_id: 0,
            event_size,
            log_pos,
        }
    }
}

/// Schema-qualified table a rows event applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Payload of a rotate event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotateEvent {
    /// Position in the next file where events resume.
    pub position: u64,
    pub next_log_name: String,
}

/// Payload of a rows event.
///
/// For updates, `rows` alternates before-image, after-image.
#[derive(Debug, Clone, PartialEq)]
pub struct RowsEvent {
    pub table: TableRef,
    pub rows: Vec<ColumnValues>,
}

/// Category-specific event payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EventBody {
    Rotate(RotateEvent),
    Rows(RowsEvent),
    /// Any event the reader does not act upon.
    Other,
}

/// A decoded binlog event as produced by the client library.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub header: EventHeader,
    pub body: EventBody,
}

impl RawEvent {
    /// A rotate event announcing `next_log_name`.
    pub fn rotate(log_pos: u32, next_log_name: impl Into<String>) -> Self {
        Self {
            header: EventHeader::new(EventType::RotateEvent, log_pos, 0),
            body: EventBody::Rotate(RotateEvent {
                position: 4,
                next_log_name: next_log_name.into(),
            }),
        }
    }

    /// A rows event of `event_type` against `schema.table`.
    pub fn rows(
        event_type: EventType,
        log_pos: u32,
        event_size: u32,
        schema: impl Into<String>,
        table: impl Into<String>,
        rows: Vec<ColumnValues>,
    ) -> Self {
        Self {
            header: EventHeader::new(event_type, log_pos, event_size),
            body: EventBody::Rows(RowsEvent {
                table: TableRef {
                    schema: schema.into(),
                    table: table.into(),
                },
                rows,
            }),
        }
    }

    /// An event carrying nothing the reader needs.
    pub fn other(event_type: EventType, log_pos: u32, event_size: u32) -> Self {
        Self {
            header: EventHeader::new(event_type, log_pos, event_size),
            body: EventBody::Other,
        }
    }
}

/// Settings handed to the external client when it is built.
///
/// Produced by [`ReaderConfig::syncer_config`](crate::config::ReaderConfig::syncer_config).
#[derive(Clone)]
pub struct BinlogSyncerConfig {
    pub server_id: u32,
    pub flavor: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub tls: TlsConfig,
    /// Decode DECIMAL columns as exact decimals rather than floats.
    pub use_decimal: bool,
    /// Reconnect ceiling applied inside the client (0 = client default).
    pub max_reconnect_attempts: u32,
    /// Render temporal columns in UTC.
    pub timestamp_location_utc: bool,
    pub read_timeout: Duration,
    pub heartbeat_period: Duration,
}

impl fmt::Debug for BinlogSyncerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinlogSyncerConfig")
            .field("server_id", &self.server_id)
            .field("flavor", &self.flavor)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("tls_enabled", &self.tls.enabled)
            .field("use_decimal", &self.use_decimal)
            .field("max_reconnect_attempts", &self.max_reconnect_attempts)
            .field("timestamp_location_utc", &self.timestamp_location_utc)
            .field("read_timeout", &self.read_timeout)
            .field("heartbeat_period", &self.heartbeat_period)
            .finish()
    }
}

/// An open replication session.
pub trait BinlogStreamer: Send + 'static {
    /// Fetch the next event.
    ///
    /// May wait indefinitely for the server to produce one; any timeout is the
    /// client's own configuration.
    fn get_event(&mut self) -> BoxFuture<'_, RawEvent>;
}

/// Factory for replication sessions against one server.
pub trait BinlogSyncer: Send + Sync + 'static {
    type Streamer: BinlogStreamer;

    /// Register as a replica and start streaming from `position`.
    fn start_sync(&self, position: BinlogPosition) -> BoxFuture<'_, Self::Streamer>;

    /// Tear down the underlying connection.
    fn close(&self);
}
