//! IVersionedStore: the system-time versioning surface.

use crate::errors::SagaResult;
use crate::models::{AsOfRecord, LiveRecord, PartitionReport, TimePoint, VersionId, VersionedRecord};

/// A store whose records can be reconstructed as of any system instant.
///
/// Mutations are atomic per id. Reads never fail on absence: an id that did
/// not exist at the requested instant yields `None` or is left out.
pub trait IVersionedStore<P, T: TimePoint>: Send + Sync {
    // Mutations
    fn create(&self, id: &str, payload: P, now: T) -> SagaResult<VersionId>;
    fn update(&self, id: &str, payload: P, now: T) -> SagaResult<VersionId>;
    fn delete(&self, id: &str, now: T) -> SagaResult<()>;

    // AS OF reconstruction
    fn as_of(&self, id: &str, at: T) -> SagaResult<Option<AsOfRecord<P, T>>>;
    fn scan_as_of(&self, at: T) -> SagaResult<Vec<AsOfRecord<P, T>>>;

    // Current state and audit
    fn get(&self, id: &str) -> SagaResult<Option<LiveRecord<P, T>>>;
    fn history(&self, id: &str) -> SagaResult<Vec<VersionedRecord<P, T>>>;
    fn verify_partition(&self, id: &str) -> SagaResult<PartitionReport<T>>;
}
