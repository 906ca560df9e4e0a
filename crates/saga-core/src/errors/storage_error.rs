/// Persistence layer errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {message}")]
    SqliteError { message: String },

    #[error("migration v{version:03} failed: {reason}")]
    MigrationFailed { version: u32, reason: String },

    /// The single write connection stayed locked past the caller's deadline.
    #[error("write connection busy after {waited_ms}ms")]
    WriterBusy { waited_ms: u64 },

    /// A transaction reached its deadline before commit and was rolled back.
    #[error("write deadline exceeded after {elapsed_ms}ms, rolled back")]
    DeadlineExceeded { elapsed_ms: u64 },

    #[error("corrupt row in {table}: {reason}")]
    CorruptRow { table: String, reason: String },
}
