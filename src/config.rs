//! Configuration for the binlog reader.
//!
//! Configuration is passed to [`BinlogReader::new()`](crate::BinlogReader::new)
//! and can be constructed programmatically or deserialized from YAML/JSON.
//!
//! # Quick Start
//!
//! ```rust
//! use binlog_streamer::config::{ConnectionConfig, ReaderConfig};
//!
//! let config = ReaderConfig {
//!     connection: ConnectionConfig::for_testing("replica-1.internal", "migrator"),
//!     max_auth_failures: 3,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```
//!
//! # Configuration Structure
//!
//! ```text
//! ReaderConfig
//! ├── replica_server_id: u32         # Server id we register as
//! ├── connection: ConnectionConfig
//! │   ├── host / port / user / password
//! │   └── tls: TlsConfig
//! ├── max_reconnect_attempts: u32    # Handed to the client (0 = client default)
//! ├── max_auth_failures: u32         # Breaker ceiling (0 = never trip)
//! ├── read_timeout: "30s"            # Handed to the client
//! ├── heartbeat_period: "10s"        # Handed to the client
//! └── entries_channel_capacity: 1    # Bounded hand-off size
//! ```
//!
//! # YAML Example
//!
//! ```yaml
//! replica_server_id: 99999
//! connection:
//!   host: "db-primary.internal"
//!   port: 3306
//!   user: "gh-migrator"
//!   password: "${MYSQL_PASSWORD}"
//!   tls:
//!     enabled: true
//!     ca_path: "/etc/ssl/mysql-ca.pem"
//! max_auth_failures: 5
//! read_timeout: "1m"
//! entries_channel_capacity: 1
//! ```

use crate::client::BinlogSyncerConfig;
use crate::entry::BinlogEntry;
use crate::error::{BinlogError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

/// Default server id we register with as a replica.
pub const DEFAULT_REPLICA_SERVER_ID: u32 = 99999;

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_HEARTBEAT_PERIOD: Duration = Duration::from_secs(10);

// ═══════════════════════════════════════════════════════════════════════════════
// Top-level config: passed to BinlogReader::new()
// ═══════════════════════════════════════════════════════════════════════════════

/// Reader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Server id presented to the primary. Must be unique among its replicas.
    #[serde(default = "default_replica_server_id")]
    pub replica_server_id: u32,

    /// Where and how to connect.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Reconnect ceiling for the external client (0 = client default).
    /// The reader itself never reconnects.
    #[serde(default)]
    pub max_reconnect_attempts: u32,

    /// Consecutive auth failures before aborting. 0 disables the breaker.
    #[serde(default)]
    pub max_auth_failures: u32,

    /// Client read timeout (humantime, e.g. `"30s"`).
    #[serde(default = "default_read_timeout")]
    pub read_timeout: String,

    /// Heartbeat period requested from the primary (humantime).
    #[serde(default = "default_heartbeat_period")]
    pub heartbeat_period: String,

    /// Capacity of the bounded entries hand-off.
    /// 1 reproduces a rendezvous-style hand-off with a single slot.
    #[serde(default = "default_entries_channel_capacity")]
    pub entries_channel_capacity: usize,
}

fn default_replica_server_id() -> u32 {
    DEFAULT_REPLICA_SERVER_ID
}

fn default_read_timeout() -> String {
    "30s".to_string()
}

fn default_heartbeat_period() -> String {
    "10s".to_string()
}

fn default_entries_channel_capacity() -> usize {
    1
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            replica_server_id: DEFAULT_REPLICA_SERVER_ID,
            connection: ConnectionConfig::default(),
            max_reconnect_attempts: 0,
            max_auth_failures: 0,
            read_timeout: default_read_timeout(),
            heartbeat_period: default_heartbeat_period(),
            entries_channel_capacity: 1,
        }
    }
}

impl ReaderConfig {
    /// Create a minimal config for testing.
    pub fn for_testing(max_auth_failures: u32) -> Self {
        Self {
            connection: ConnectionConfig::for_testing("127.0.0.1", "test"),
            max_auth_failures,
            ..Default::default()
        }
    }

    /// Parse the read_timeout string to a Duration.
    pub fn read_timeout_duration(&self) -> Duration {
        humantime::parse_duration(&self.read_timeout).unwrap_or(DEFAULT_READ_TIMEOUT)
    }

    /// Parse the heartbeat_period string to a Duration.
    pub fn heartbeat_period_duration(&self) -> Duration {
        humantime::parse_duration(&self.heartbeat_period).unwrap_or(DEFAULT_HEARTBEAT_PERIOD)
    }

    /// Check invariants the reader relies on.
    pub fn validate(&self) -> Result<()> {
        if self.entries_channel_capacity == 0 {
            return Err(BinlogError::Config(
                "entries_channel_capacity must be at least 1".into(),
            ));
        }
        if self.connection.host.trim().is_empty() {
            return Err(BinlogError::Config("connection.host must not be empty".into()));
        }
        let tls = &self.connection.tls;
        if tls.allow_insecure && !tls.enabled {
            return Err(BinlogError::Config(
                "tls.allow_insecure requires tls.enabled".into(),
            ));
        }
        Ok(())
    }

    /// Build the bounded hand-off channel. Capacity is never below 1.
    pub fn entries_channel(&self) -> (mpsc::Sender<BinlogEntry>, mpsc::Receiver<BinlogEntry>) {
        mpsc::channel(self.entries_channel_capacity.max(1))
    }

    /// Settings for the external binlog client.
    ///
    /// Decimals are decoded exactly and temporal columns rendered in UTC.
    pub fn syncer_config(&self) -> BinlogSyncerConfig {
        BinlogSyncerConfig {
            server_id: self.replica_server_id,
            flavor: "mysql".to_string(),
            host: self.connection.host.clone(),
            port: self.connection.port,
            user: self.connection.user.clone(),
            password: self.connection.password.clone(),
            tls: self.connection.tls.clone(),
            use_decimal: true,
            max_reconnect_attempts: self.max_reconnect_attempts,
            timestamp_location_utc: true,
            read_timeout: self.read_timeout_duration(),
            heartbeat_period: self.heartbeat_period_duration(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ConnectionConfig: server address and credentials
// ═══════════════════════════════════════════════════════════════════════════════

/// Server address and credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub tls: TlsConfig,
}

fn default_port() -> u16 {
    3306
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: String::new(),
            password: String::new(),
            tls: TlsConfig::default(),
        }
    }
}

impl ConnectionConfig {
    pub fn for_testing(host: &str, user: &str) -> Self {
        Self {
            host: host.to_string(),
            user: user.to_string(),
            ..Default::default()
        }
    }

    /// `host:port` for logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("tls", &self.tls)
            .finish()
    }
}

/// TLS settings handed through to the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub ca_path: Option<String>,

    #[serde(default)]
    pub cert_path: Option<String>,

    #[serde(default)]
    pub key_path: Option<String>,

    /// Skip certificate verification. Only meaningful with `enabled`.
    #[serde(default)]
    pub allow_insecure: bool,

    /// Override the server name used for verification.
    #[serde(default)]
    pub server_name: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
