//! Connection management: one serialized writer, a pool of readers.

pub mod pragmas;
mod read_pool;
mod write_connection;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use saga_core::config::StorageConfig;
use saga_core::errors::SagaResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Writer plus optional readers.
///
/// In-memory databases are private to their connection, so they have no
/// readers and all reads go through the writer. Such reads wait at most
/// `shared_read_wait` for an in-flight write.
pub struct ConnectionPool {
    pub writer: Arc<WriteConnection>,
    pub readers: Option<Arc<ReadPool>>,
    shared_read_wait: Duration,
}

impl ConnectionPool {
    /// Open a file-backed pool. `before_readers` runs on the writer first,
    /// so migrations exist before read-only connections attach.
    pub fn open<F>(path: &Path, config: &StorageConfig, before_readers: F) -> SagaResult<Self>
    where
        F: FnOnce(&Connection) -> SagaResult<()>,
    {
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        let writer = WriteConnection::open(path, busy_timeout)?;
        writer.with_conn_sync(before_readers)?;

        let readers = if config.read_pool_size > 0 {
            Some(Arc::new(ReadPool::open(
                path,
                config.read_pool_size,
                busy_timeout,
            )?))
        } else {
            None
        };

        debug!(
            path = %path.display(),
            readers = config.read_pool_size,
            "opened connection pool"
        );

        Ok(Self {
            writer: Arc::new(writer),
            readers,
            shared_read_wait: busy_timeout,
        })
    }

    pub fn open_in_memory<F>(config: &StorageConfig, init: F) -> SagaResult<Self>
    where
        F: FnOnce(&Connection) -> SagaResult<()>,
    {
        let writer = WriteConnection::open_in_memory()?;
        writer.with_conn_sync(init)?;
        Ok(Self {
            writer: Arc::new(writer),
            readers: None,
            shared_read_wait: Duration::from_millis(config.busy_timeout_ms),
        })
    }

    /// Run a read on a pooled reader, or on the writer when there is none.
    /// Reads on the writer fail with `WriterBusy` once `shared_read_wait`
    /// passes.
    pub fn with_reader<F, T>(&self, f: F) -> SagaResult<T>
    where
        F: FnOnce(&Connection) -> SagaResult<T>,
    {
        match &self.readers {
            Some(readers) => readers.with_conn(f),
            None => self.writer.with_conn_timeout(self.shared_read_wait, f),
        }
    }
}
