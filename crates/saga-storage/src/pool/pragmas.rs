//! Connection pragmas.

use std::time::Duration;

use rusqlite::Connection;

use saga_core::errors::SagaResult;

use crate::to_storage_err;

/// Pragmas for the write connection. WAL is a no-op for in-memory databases.
pub fn apply_pragmas(conn: &Connection) -> SagaResult<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA temp_store = MEMORY;",
    )
    .map_err(|e| to_storage_err(format!("apply pragmas: {e}")))
}

/// Pragmas for read-only pooled connections.
pub fn apply_read_pragmas(conn: &Connection) -> SagaResult<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA temp_store = MEMORY;
         PRAGMA query_only = ON;",
    )
    .map_err(|e| to_storage_err(format!("apply read pragmas: {e}")))
}

pub fn apply_busy_timeout(conn: &Connection, timeout: Duration) -> SagaResult<()> {
    conn.busy_timeout(timeout)
        .map_err(|e| to_storage_err(format!("busy_timeout: {e}")))
}
