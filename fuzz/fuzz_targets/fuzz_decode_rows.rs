//! Fuzz target for rows decoding.
//!
//! Any event type and row count must either decode into the expected number
//! of mutations or fail with a decode error, never panic.

#![no_main]

use binlog_streamer::client::{EventType, RowsEvent, TableRef};
use binlog_streamer::decoder::{decode_rows, dml_for};
use binlog_streamer::{ColumnValue, ColumnValues, EventDml};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (u8, Vec<Vec<i64>>)| {
    let (type_code, raw_rows) = data;
    let row_count = raw_rows.len();

    let event = RowsEvent {
        table: TableRef {
            schema: "db".into(),
            table: "t".into(),
        },
        rows: raw_rows
            .into_iter()
            .map(|cols| ColumnValues::from(cols.into_iter().map(ColumnValue::SignedInt).collect::<Vec<_>>()))
            .collect(),
    };

    let Ok(dml) = dml_for(EventType::from_u8(type_code)) else {
        return;
    };

    match decode_rows(dml, event) {
        Ok(mutations) => {
            let expected = if dml == EventDml::Update { row_count / 2 } else { row_count };
            assert_eq!(mutations.count(), expected);
        }
        Err(_) => assert!(dml == EventDml::Update && row_count % 2 == 1),
    }
});
