//! Totally ordered instants and their storage keys.

use std::fmt::Debug;

use chrono::{DateTime, Utc};

/// An instant the engine can order and persist.
///
/// `to_key` must be strictly order-preserving: `a < b` iff
/// `a.to_key() < b.to_key()`. Keys are stored in INTEGER columns so SQL
/// comparisons match `Ord` on the instant.
pub trait TimePoint: Copy + Ord + Debug + Send + Sync + 'static {
    fn to_key(self) -> i64;

    /// Inverse of `to_key`. `None` for keys this type cannot represent.
    fn from_key(key: i64) -> Option<Self>;
}

/// Story time and monotonic counters.
impl TimePoint for i64 {
    fn to_key(self) -> i64 {
        self
    }

    fn from_key(key: i64) -> Option<Self> {
        Some(key)
    }
}

/// Wall-clock instants at microsecond resolution.
impl TimePoint for DateTime<Utc> {
    fn to_key(self) -> i64 {
        self.timestamp_micros()
    }

    fn from_key(key: i64) -> Option<Self> {
        DateTime::from_timestamp_micros(key)
    }
}
