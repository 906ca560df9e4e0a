//! `StorageEngine`: owns the connection pool and the schema.
//!
//! All reads go through `with_reader()`, all writes through `with_tx()` /
//! `with_tx_until()`. Query modules never open their own connections.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rusqlite::{Connection, Transaction};
use tracing::info;

use saga_core::config::StorageConfig;
use saga_core::errors::SagaResult;

use crate::migrations;
use crate::pool::{ConnectionPool, WriteConnection};

pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a file-backed engine. Runs pending migrations before any reader
    /// attaches.
    pub fn open(path: &Path, config: &StorageConfig) -> SagaResult<Self> {
        let pool = ConnectionPool::open(path, config, |conn| {
            migrations::run_migrations(conn).map(|_| ())
        })?;
        info!(path = %path.display(), "storage engine opened");
        Ok(Self { pool })
    }

    /// Open a private in-memory engine (tests, scratch use) with default
    /// settings.
    pub fn open_in_memory() -> SagaResult<Self> {
        Self::open_in_memory_with(&StorageConfig::default())
    }

    /// In-memory engine. There are no readers, so reads share the writer
    /// and wait up to `busy_timeout_ms` for an in-flight write.
    pub fn open_in_memory_with(config: &StorageConfig) -> SagaResult<Self> {
        let pool = ConnectionPool::open_in_memory(config, |conn| {
            migrations::run_migrations(conn).map(|_| ())
        })?;
        Ok(Self { pool })
    }

    /// File-backed when `db_path` is set, in-memory otherwise.
    pub fn from_config(config: &StorageConfig) -> SagaResult<Self> {
        match &config.db_path {
            Some(path) => Self::open(path, config),
            None => Self::open_in_memory_with(config),
        }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn writer(&self) -> &Arc<WriteConnection> {
        &self.pool.writer
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.pool.writer.path()
    }

    pub fn with_reader<F, T>(&self, f: F) -> SagaResult<T>
    where
        F: FnOnce(&Connection) -> SagaResult<T>,
    {
        self.pool.with_reader(f)
    }

    /// Raw write access outside a transaction.
    pub fn with_writer<F, T>(&self, f: F) -> SagaResult<T>
    where
        F: FnOnce(&Connection) -> SagaResult<T>,
    {
        self.pool.writer.with_conn_sync(f)
    }

    pub fn with_tx<F, T>(&self, f: F) -> SagaResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> SagaResult<T>,
    {
        self.pool.writer.with_tx(f)
    }

    pub fn with_tx_until<F, T>(&self, deadline: Instant, f: F) -> SagaResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> SagaResult<T>,
    {
        self.pool.writer.with_tx_until(deadline, f)
    }

    pub fn schema_version(&self) -> SagaResult<u32> {
        self.with_reader(migrations::current_version)
    }
}
