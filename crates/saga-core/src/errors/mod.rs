mod saga_error;
mod storage_error;

pub use saga_error::{SagaError, SagaResult};
pub use storage_error::StorageError;
