//! Round-robin pool of read-only connections.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};

use saga_core::errors::SagaResult;

use super::pragmas;
use crate::to_storage_err;

/// Read connections. In WAL mode they never block the writer.
pub struct ReadPool {
    conns: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    pub fn open(path: &Path, size: usize, busy_timeout: Duration) -> SagaResult<Self> {
        let size = size.max(1);
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let mut conns = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(path, flags)
                .map_err(|e| to_storage_err(format!("open reader: {e}")))?;
            pragmas::apply_read_pragmas(&conn)?;
            pragmas::apply_busy_timeout(&conn, busy_timeout)?;
            conns.push(Mutex::new(conn));
        }

        Ok(Self {
            conns,
            next: AtomicUsize::new(0),
        })
    }

    pub fn size(&self) -> usize {
        self.conns.len()
    }

    /// Run `f` on the first free reader, starting from the round-robin
    /// cursor. Waits on the cursor's reader if all are busy.
    pub fn with_conn<F, T>(&self, f: F) -> SagaResult<T>
    where
        F: FnOnce(&Connection) -> SagaResult<T>,
    {
        let len = self.conns.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed) % len;

        for offset in 0..len {
            if let Some(conn) = self.conns[(start + offset) % len].try_lock() {
                return f(&conn);
            }
        }

        let conn = self.conns[start].lock();
        f(&conn)
    }
}
