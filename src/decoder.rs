// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Rows-event decoding.
//!
//! Turns one rows event into a sequence of [`BinlogDmlEvent`]s, one per row:
//!
//! ```text
//! WRITE_ROWS   [r0, r1, r2]          → Insert(r0), Insert(r1), Insert(r2)
//! DELETE_ROWS  [r0, r1]              → Delete(r0), Delete(r1)
//! UPDATE_ROWS  [b0, a0, b1, a1]      → Update(b0 → a0), Update(b1 → a1)
//! ```
//!
//! The event is validated before the first mutation is produced, so a
//! malformed update never yields a partial prefix.
//!
//! [`DmlEvents`] is lazy: the reader pulls one mutation, hands it off over
//! the bounded channel, then pulls the next. Rows are moved, not cloned.

use crate::client::{EventType, RowsEvent, TableRef};
use crate::entry::{BinlogDmlEvent, ColumnValues, EventDml};
use crate::error::DecodeError;
use std::vec;

/// Resolve the DML kind of a rows event type.
pub fn dml_for(event_type: EventType) -> Result<EventDml, DecodeError> {
    EventDml::from_event_type(event_type).ok_or(DecodeError::UnknownDml { event_type })
}

/// Decode a rows event into its per-row mutations.
///
/// Update events must carry an even number of rows (before/after pairs);
/// anything else is rejected up front.
pub fn decode_rows(dml: EventDml, event: RowsEvent) -> Result<DmlEvents, DecodeError> {
    let RowsEvent { table, rows } = event;

    if dml == EventDml::Update && rows.len() % 2 != 0 {
        return Err(DecodeError::UnpairedUpdateRows {
            schema: table.schema,
            table: table.table,
            rows: rows.len(),
        });
    }

    Ok(DmlEvents {
        table,
        dml,
        rows: rows.into_iter(),
    })
}

/// Lazy per-row mutations of one rows event, in row order.
#[derive(Debug)]
pub struct DmlEvents {
    table: TableRef,
    dml: EventDml,
    rows: vec::IntoIter<ColumnValues>,
}

impl DmlEvents {
    pub fn dml(&self) -> EventDml {
        self.dml
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }
}

impl Iterator for DmlEvents {
    type Item = BinlogDmlEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let schema = &self.table.schema;
        let table = &self.table.table;
        match self.dml {
            EventDml::Insert => self
                .rows
                .next()
                .map(|row| BinlogDmlEvent::insert(schema, table, row)),
            EventDml::Delete => self
                .rows
                .next()
                .map(|row| BinlogDmlEvent::delete(schema, table, row)),
            EventDml::Update => {
                let before = self.rows.next()?;
                // Pairing was checked in decode_rows
                let after = self.rows.next()?;
                Some(BinlogDmlEvent::update(schema, table, before, after))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.dml {
            EventDml::Update => self.rows.len() / 2,
            EventDml::Insert | EventDml::Delete => self.rows.len(),
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DmlEvents {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ColumnValue;

    fn row(id: i64) -> ColumnValues {
        vec![ColumnValue::SignedInt(id), ColumnValue::String(format!("row-{}", id))].into()
    }

    fn rows_event(ids: &[i64]) -> RowsEvent {
        RowsEvent {
            table: TableRef {
                schema: "shop".into(),
                table: "orders".into(),
            },
            rows: ids.iter().copied().map(row).collect(),
        }
    }

    #[test]
    fn test_dml_for_rows_types() {
        assert_eq!(dml_for(EventType::WriteRowsEventV2).unwrap(), EventDml::Insert);
        assert_eq!(dml_for(EventType::UpdateRowsEventV1).unwrap(), EventDml::Update);
        assert_eq!(dml_for(EventType::DeleteRowsEventV0).unwrap(), EventDml::Delete);
    }

    #[test]
    fn test_dml_for_unknown() {
        let err = dml_for(EventType::PartialUpdateRowsEvent).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownDml {
                event_type: EventType::PartialUpdateRowsEvent
            }
        );
        assert_eq!(err.to_string(), "Unknown DML type: PartialUpdateRowsEvent");
    }

    #[test]
    fn test_insert_one_per_row() {
        let events: Vec<_> = decode_rows(EventDml::Insert, rows_event(&[1, 2, 3]))
            .unwrap()
            .collect();

        assert_eq!(events.len(), 3);
        for (event, id) in events.iter().zip([1, 2, 3]) {
            assert_eq!(event.dml, EventDml::Insert);
            assert_eq!(event.database_name, "shop");
            assert_eq!(event.table_name, "orders");
            assert_eq!(event.new_column_values, Some(row(id)));
            assert!(event.where_column_values.is_none());
        }
    }

    #[test]
    fn test_delete_one_per_row() {
        let events: Vec<_> = decode_rows(EventDml::Delete, rows_event(&[7, 8]))
            .unwrap()
            .collect();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].where_column_values, Some(row(7)));
        assert_eq!(events[1].where_column_values, Some(row(8)));
        assert!(events.iter().all(|e| e.new_column_values.is_none()));
    }

    #[test]
    fn test_update_pairs_in_order() {
        // [before0, after0, before1, after1]
        let events: Vec<_> = decode_rows(EventDml::Update, rows_event(&[10, 11, 20, 21]))
            .unwrap()
            .collect();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].where_column_values, Some(row(10)));
        assert_eq!(events[0].new_column_values, Some(row(11)));
        assert_eq!(events[1].where_column_values, Some(row(20)));
        assert_eq!(events[1].new_column_values, Some(row(21)));
    }

    #[test]
    fn test_update_odd_rows_rejected() {
        let err = decode_rows(EventDml::Update, rows_event(&[1, 2, 3])).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnpairedUpdateRows {
                schema: "shop".into(),
                table: "orders".into(),
                rows: 3,
            }
        );
    }

    #[test]
    fn test_empty_event_yields_nothing() {
        for dml in [EventDml::Insert, EventDml::Update, EventDml::Delete] {
            let mut events = decode_rows(dml, rows_event(&[])).unwrap();
            assert_eq!(events.len(), 0);
            assert!(events.next().is_none());
        }
    }

    #[test]
    fn test_size_hint_tracks_progress() {
        let mut events = decode_rows(EventDml::Update, rows_event(&[1, 2, 3, 4, 5, 6])).unwrap();
        assert_eq!(events.len(), 3);
        events.next();
        assert_eq!(events.len(), 2);
        assert_eq!(events.dml(), EventDml::Update);
        assert_eq!(events.table().to_string(), "shop.orders");
    }
}
