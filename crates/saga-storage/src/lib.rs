//! # saga-storage
//!
//! SQLite persistence layer for the saga engine.
//! One live table and one append-only history table per versioned entity
//! kind, plus the relationship interval table.
//! Single write connection + read pool (WAL mode).

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

/// Helper to convert a string message into a SagaError::StorageError.
pub fn to_storage_err(msg: String) -> saga_core::SagaError {
    saga_core::SagaError::StorageError(saga_core::errors::StorageError::SqliteError {
        message: msg,
    })
}

/// Helper for rows that decode but violate the schema's meaning.
pub(crate) fn corrupt_row(table: &str, reason: impl Into<String>) -> saga_core::SagaError {
    saga_core::SagaError::StorageError(saga_core::errors::StorageError::CorruptRow {
        table: table.to_string(),
        reason: reason.into(),
    })
}
