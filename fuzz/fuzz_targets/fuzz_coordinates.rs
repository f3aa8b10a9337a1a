//! Fuzz target for coordinate comparison and overflow detection.
//!
//! Ordering must stay consistent and `is_log_pos_overflow_beyond_4_bytes`
//! must never panic, whatever the positions and sizes.

#![no_main]

use binlog_streamer::coordinates::LOG_POS_4_BYTE_LIMIT;
use binlog_streamer::{BinlogCoordinates, ReplayGuard};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, i64, i64, &str, i64)| {
    let (file_a, pos_a, size_a, file_b, pos_b) = data;

    let mut current = BinlogCoordinates::new(file_a, pos_a);
    current.event_size = size_a;
    let previous = BinlogCoordinates::new(file_b, pos_b);

    assert_eq!(current.cmp(&previous).reverse(), previous.cmp(&current));
    assert_eq!(current.smaller_than(&previous), current < previous);

    let overflow = current.is_log_pos_overflow_beyond_4_bytes(&previous);
    if previous.is_empty() || file_a != file_b {
        assert!(!overflow);
    } else if pos_b.checked_add(size_a).is_some_and(|end| end < LOG_POS_4_BYTE_LIMIT) {
        assert!(!overflow);
    }

    let guard = ReplayGuard::with_hint(previous.clone());
    assert_eq!(guard.is_duplicate(&current), current <= previous);
    let _ = current.file_number();
    let _ = current.to_string();
});
