//! The single serialized write connection.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::warn;

use saga_core::errors::{SagaResult, StorageError};
use saga_core::SagaError;

use super::pragmas;
use crate::to_storage_err;

/// Owns the only connection allowed to write.
pub struct WriteConnection {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl WriteConnection {
    pub fn open(path: &Path, busy_timeout: Duration) -> SagaResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        pragmas::apply_pragmas(&conn)?;
        pragmas::apply_busy_timeout(&conn, busy_timeout)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> SagaResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        pragmas::apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` with the connection, waiting as long as needed for it.
    pub fn with_conn_sync<F, T>(&self, f: F) -> SagaResult<T>
    where
        F: FnOnce(&Connection) -> SagaResult<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run `f` with the connection, failing with `WriterBusy` if it stays
    /// locked past `timeout`.
    pub fn with_conn_timeout<F, T>(&self, timeout: Duration, f: F) -> SagaResult<T>
    where
        F: FnOnce(&Connection) -> SagaResult<T>,
    {
        let conn = self.conn.try_lock_for(timeout).ok_or_else(|| {
            SagaError::StorageError(StorageError::WriterBusy {
                waited_ms: timeout.as_millis() as u64,
            })
        })?;
        f(&conn)
    }

    /// Lock the connection, giving up after `timeout`.
    pub fn try_lock_for(&self, timeout: Duration) -> Option<MutexGuard<'_, Connection>> {
        self.conn.try_lock_for(timeout)
    }

    /// Run `f` inside one `BEGIN IMMEDIATE` transaction.
    /// Commits on `Ok`, rolls back on `Err`.
    pub fn with_tx<F, T>(&self, f: F) -> SagaResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> SagaResult<T>,
    {
        let mut conn = self.conn.lock();
        run_tx(&mut conn, None, f)
    }

    /// Like `with_tx`, but everything (waiting for the connection
    /// included) must finish before `deadline`. A transaction that
    /// overruns is rolled back instead of committed.
    pub fn with_tx_until<F, T>(&self, deadline: Instant, f: F) -> SagaResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> SagaResult<T>,
    {
        let started = Instant::now();
        let wait = deadline.saturating_duration_since(started);
        let mut conn = self.conn.try_lock_for(wait).ok_or_else(|| {
            SagaError::StorageError(StorageError::WriterBusy {
                waited_ms: wait.as_millis() as u64,
            })
        })?;
        run_tx(&mut conn, Some((started, deadline)), f)
    }
}

fn run_tx<F, T>(
    conn: &mut Connection,
    deadline: Option<(Instant, Instant)>,
    f: F,
) -> SagaResult<T>
where
    F: FnOnce(&Transaction<'_>) -> SagaResult<T>,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| to_storage_err(format!("begin transaction: {e}")))?;

    // Dropping `tx` on any early return rolls it back.
    let value = f(&tx)?;

    if let Some((started, deadline)) = deadline {
        if Instant::now() > deadline {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            warn!(elapsed_ms, "write overran its deadline, rolling back");
            tx.rollback()
                .map_err(|e| to_storage_err(format!("rollback: {e}")))?;
            return Err(SagaError::StorageError(StorageError::DeadlineExceeded {
                elapsed_ms,
            }));
        }
    }

    tx.commit()
        .map_err(|e| to_storage_err(format!("commit: {e}")))?;
    Ok(value)
}
