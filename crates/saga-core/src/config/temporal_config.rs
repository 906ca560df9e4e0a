//! Versioned-write configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the versioning write path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    /// How long a writer waits for the per-id lock before giving up.
    pub lock_timeout_ms: u64,
    /// Upper bound on a whole write, lock wait included. Past it the
    /// transaction is rolled back instead of committed.
    pub write_timeout_ms: u64,
}

impl TemporalConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5_000,
            write_timeout_ms: 10_000,
        }
    }
}
