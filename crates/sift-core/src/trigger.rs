//! Schedule triggers
//!
//! The orchestrator loops are driven by two small, clock-free decision
//! points so tests can simulate time and record counts without sleeping:
//! - `ChangeDetector` fires when the raw/manual record counts move
//! - `MonthBoundary` fires once per new calendar month

use chrono::{DateTime, Datelike, Utc};

/// Detects new raw/manual records by comparing counts to the last-seen
/// values
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    last_raw: i64,
    last_manual: i64,
}

impl ChangeDetector {
    /// Start from the current counts; the first `check` only fires if the
    /// counts move after this point
    pub fn new(raw_count: i64, manual_count: i64) -> Self {
        Self {
            last_raw: raw_count,
            last_manual: manual_count,
        }
    }

    /// True when either count changed since the last check; updates the
    /// last-seen values
    pub fn check(&mut self, raw_count: i64, manual_count: i64) -> bool {
        let changed = raw_count != self.last_raw || manual_count != self.last_manual;
        self.last_raw = raw_count;
        self.last_manual = manual_count;
        changed
    }
}

/// Fires once per new calendar month
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthBoundary {
    last_run: Option<(i32, u32)>,
}

impl MonthBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `now` falls in a month no previous call has seen.
    ///
    /// The first call always fires, matching a freshly started process
    /// that has never run an analysis.
    pub fn should_run(&mut self, now: DateTime<Utc>) -> bool {
        let current = (now.year(), now.month());
        if self.last_run == Some(current) {
            return false;
        }
        self.last_run = Some(current);
        true
    }
}
