// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Change records handed to the downstream applier.
//!
//! A [`BinlogEntry`] pairs the coordinate of the rows event it came from with
//! one row mutation ([`BinlogDmlEvent`]). Which images are populated depends
//! on the DML kind:
//!
//! | DML | `where_column_values` (before) | `new_column_values` (after) |
//! |-----|-------------------------------|-----------------------------|
//! | Insert | - | row |
//! | Update | before row | after row |
//! | Delete | row | - |
//!
//! Rows are kept in the column order reported by the binlog client. No
//! schema checks happen here.

use crate::client::EventType;
use crate::coordinates::BinlogCoordinates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row mutation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventDml {
    Insert,
    Update,
    Delete,
}

impl EventDml {
    /// Map a rows event type to its DML kind.
    ///
    /// Returns `None` for anything that is not a write/update/delete rows
    /// event, including partial JSON updates.
    pub fn from_event_type(event_type: EventType) -> Option<Self> {
        use EventType::*;
        match event_type {
            WriteRowsEventV0 | WriteRowsEventV1 | WriteRowsEventV2 => Some(EventDml::Insert),
            UpdateRowsEventV0 | UpdateRowsEventV1 | UpdateRowsEventV2 => Some(EventDml::Update),
            DeleteRowsEventV0 | DeleteRowsEventV1 | DeleteRowsEventV2 => Some(EventDml::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventDml::Insert => "insert",
            EventDml::Update => "update",
            EventDml::Delete => "delete",
        }
    }
}

impl fmt::Display for EventDml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventDml::Insert => "INSERT",
            EventDml::Update => "UPDATE",
            EventDml::Delete => "DELETE",
        })
    }
}

/// A single column value as decoded by the binlog client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    Null,
    SignedInt(i64),
    UnsignedInt(u64),
    Float(f32),
    Double(f64),
    /// Exact decimal text (the client decodes DECIMAL without float loss).
    Decimal(String),
    String(String),
    Bytes(Vec<u8>),
    /// DATE / TIME / DATETIME / TIMESTAMP rendered by the client (UTC).
    Temporal(String),
    Json(serde_json::Value),
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Null => f.write_str("NULL"),
            ColumnValue::SignedInt(v) => write!(f, "{}", v),
            ColumnValue::UnsignedInt(v) => write!(f, "{}", v),
            ColumnValue::Float(v) => write!(f, "{}", v),
            ColumnValue::Double(v) => write!(f, "{}", v),
            ColumnValue::Decimal(v) | ColumnValue::String(v) | ColumnValue::Temporal(v) => {
                f.write_str(v)
            }
            ColumnValue::Bytes(v) => f.write_str(&String::from_utf8_lossy(v)),
            ColumnValue::Json(v) => write!(f, "{}", v),
        }
    }
}

/// One row image: column values in table column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnValues {
    values: Vec<ColumnValue>,
}

impl ColumnValues {
    pub fn new(values: Vec<ColumnValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at column `index`, if the row has that many columns.
    pub fn get(&self, index: usize) -> Option<&ColumnValue> {
        self.values.get(index)
    }

    pub fn as_slice(&self) -> &[ColumnValue] {
        &self.values
    }

    /// Column `index` rendered as text. `None` for missing or NULL columns.
    pub fn string_column(&self, index: usize) -> Option<String> {
        match self.values.get(index)? {
            ColumnValue::Null => None,
            value => Some(value.to_string()),
        }
    }

    pub fn into_values(self) -> Vec<ColumnValue> {
        self.values
    }
}

impl From<Vec<ColumnValue>> for ColumnValues {
    fn from(values: Vec<ColumnValue>) -> Self {
        Self::new(values)
    }
}

impl fmt::Display for ColumnValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("]")
    }
}

/// A single row mutation against one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinlogDmlEvent {
    pub database_name: String,
    pub table_name: String,
    pub dml: EventDml,
    /// Before-image; set for updates and deletes.
    pub where_column_values: Option<ColumnValues>,
    /// After-image; set for inserts and updates.
    pub new_column_values: Option<ColumnValues>,
}

impl BinlogDmlEvent {
    /// An event with no images yet.
    pub fn new(database_name: impl Into<String>, table_name: impl Into<String>, dml: EventDml) -> Self {
        Self {
            database_name: database_name.into(),
            table_name: table_name.into(),
            dml,
            where_column_values: None,
            new_column_values: None,
        }
    }

    pub fn insert(database_name: &str, table_name: &str, row: ColumnValues) -> Self {
        Self {
            new_column_values: Some(row),
            ..Self::new(database_name, table_name, EventDml::Insert)
        }
    }

    pub fn update(database_name: &str, table_name: &str, before: ColumnValues, after: ColumnValues) -> Self {
        Self {
            where_column_values: Some(before),
            new_column_values: Some(after),
            ..Self::new(database_name, table_name, EventDml::Update)
        }
    }

    pub fn delete(database_name: &str, table_name: &str, row: ColumnValues) -> Self {
        Self {
            where_column_values: Some(row),
            ..Self::new(database_name, table_name, EventDml::Delete)
        }
    }
}

/// A change record: one mutation plus the coordinate of its rows event.
///
/// Every row of a rows event carries the same coordinate; the log offers no
/// finer granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinlogEntry {
    pub coordinates: BinlogCoordinates,
    pub dml_event: BinlogDmlEvent,
}

impl BinlogEntry {
    pub fn new(coordinates: BinlogCoordinates, dml_event: BinlogDmlEvent) -> Self {
        Self {
            coordinates,
            dml_event,
        }
    }
}

impl fmt::Display for BinlogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}.{}",
            self.coordinates,
            self.dml_event.dml,
            self.dml_event.database_name,
            self.dml_event.table_name
        )
    }
}
