//! Inclusive time window in epoch milliseconds.

use serde::{Deserialize, Serialize};

pub const MS_PER_MINUTE: i64 = 60_000;
pub const MS_PER_DAY: i64 = 24 * 60 * MS_PER_MINUTE;

/// `[since_ms, until_ms]`, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub since_ms: i64,
    pub until_ms: i64,
}

impl TimeWindow {
    pub fn new(since_ms: i64, until_ms: i64) -> Self {
        Self { since_ms, until_ms }
    }

    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.since_ms && ts <= self.until_ms
    }

    pub fn duration_ms(&self) -> i64 {
        self.until_ms - self.since_ms
    }
}
