//! Replay protection across reconnects.
//!
//! The guard keeps the coordinate of the last rows event whose mutations were
//! all handed off. A rows event at or before that watermark has already been
//! emitted and is skipped, so resuming from a coordinate that was partially
//! processed never re-emits a mutation.
//!
//! The hint moves only after a whole event has been delivered: an event's rows
//! are never partially marked applied.

use crate::coordinates::BinlogCoordinates;

/// Watermark of the last fully applied rows event.
#[derive(Debug, Clone, Default)]
pub struct ReplayGuard {
    last_applied: BinlogCoordinates,
}

impl ReplayGuard {
    /// Guard with no hint; nothing is considered applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard seeded with a hint carried over from a previous session.
    pub fn with_hint(hint: BinlogCoordinates) -> Self {
        Self { last_applied: hint }
    }

    /// The last fully applied coordinate.
    pub fn hint(&self) -> &BinlogCoordinates {
        &self.last_applied
    }

    /// Replace the hint.
    pub fn set_hint(&mut self, hint: BinlogCoordinates) {
        self.last_applied = hint;
    }

    /// `true` if an event at `coordinates` was already applied.
    pub fn is_duplicate(&self, coordinates: &BinlogCoordinates) -> bool {
        coordinates.smaller_than_or_equals(&self.last_applied)
    }

    /// `true` if the header position at `coordinates` wrapped past 4 bytes
    /// relative to the hint.
    pub fn is_overflow(&self, coordinates: &BinlogCoordinates) -> bool {
        coordinates.is_log_pos_overflow_beyond_4_bytes(&self.last_applied)
    }

    /// Record that every row of the event at `coordinates` was emitted.
    pub fn mark_applied(&mut self, coordinates: BinlogCoordinates) {
        self.last_applied = coordinates;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::LOG_POS_4_BYTE_LIMIT;

    #[test]
    fn test_fresh_guard_accepts_everything() {
        let guard = ReplayGuard::new();
        assert!(!guard.is_duplicate(&BinlogCoordinates::new("mysql-bin.000001", 4)));
        assert!(guard.hint().is_empty());
    }

    #[test]
    fn test_at_or_before_hint_is_duplicate() {
        let guard = ReplayGuard::with_hint(BinlogCoordinates::new("mysql-bin.000002", 1000));

        assert!(guard.is_duplicate(&BinlogCoordinates::new("mysql-bin.000002", 1000)));
        assert!(guard.is_duplicate(&BinlogCoordinates::new("mysql-bin.000002", 999)));
        assert!(guard.is_duplicate(&BinlogCoordinates::new("mysql-bin.000001", 50_000)));
    }

    #[test]
    fn test_after_hint_is_not_duplicate() {
        let guard = ReplayGuard::with_hint(BinlogCoordinates::new("mysql-bin.000002", 1000));

        assert!(!guard.is_duplicate(&BinlogCoordinates::new("mysql-bin.000002", 1001)));
        assert!(!guard.is_duplicate(&BinlogCoordinates::new("mysql-bin.000003", 4)));
    }

    #[test]
    fn test_mark_applied_moves_watermark() {
        let mut guard = ReplayGuard::new();
        let c = BinlogCoordinates::new("mysql-bin.000001", 300);

        assert!(!guard.is_duplicate(&c));
        guard.mark_applied(c.clone());
        assert!(guard.is_duplicate(&c));
        assert_eq!(guard.hint(), &c);
    }

    #[test]
    fn test_overflow_against_hint() {
        let guard = ReplayGuard::with_hint(BinlogCoordinates::new(
            "mysql-bin.000001",
            LOG_POS_4_BYTE_LIMIT - 50,
        ));

        let mut wrapped = BinlogCoordinates::new("mysql-bin.000001", 20);
        wrapped.event_size = 70;
        assert!(guard.is_overflow(&wrapped));

        let mut fine = BinlogCoordinates::new("mysql-bin.000001", LOG_POS_4_BYTE_LIMIT - 20);
        fine.event_size = 30;
        assert!(!guard.is_overflow(&fine));
    }
}
