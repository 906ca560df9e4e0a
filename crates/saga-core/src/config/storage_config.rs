//! Storage subsystem configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the SQLite persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. `None` opens a private in-memory database.
    pub db_path: Option<PathBuf>,
    /// Number of read connections (file-backed databases only).
    pub read_pool_size: usize,
    /// SQLite `busy_timeout` applied to every connection. Without readers
    /// it also bounds how long a read waits for the writer.
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            read_pool_size: 4,
            busy_timeout_ms: 5_000,
        }
    }
}
