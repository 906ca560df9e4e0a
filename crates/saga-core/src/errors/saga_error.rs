use super::StorageError;

/// Top-level error type for the saga engine.
/// Subsystem errors convert into this via `From` impls.
#[derive(Debug, thiserror::Error)]
pub enum SagaError {
    /// A mutation targeted an id with no live record.
    #[error("record not found: {id}")]
    NotFound { id: String },

    /// `create` on an id that already has a live record.
    #[error("record already exists: {id}")]
    AlreadyExists { id: String },

    /// Interval bounds are malformed (start after end).
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    /// Query range is malformed (from after to).
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// The per-id write lock could not be taken, or the write ran past its deadline.
    #[error("concurrent modification on {id}: {reason}")]
    ConcurrentModification { id: String, reason: String },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("config error: {0}")]
    ConfigError(String),
}

impl SagaError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists { id: id.into() }
    }

    pub fn concurrent(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConcurrentModification {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias.
pub type SagaResult<T> = Result<T, SagaError>;
