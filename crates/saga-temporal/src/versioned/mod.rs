//! System-time versioning.
//!
//! `store` owns the write path (live row + history archive in one
//! transaction), `reconstruct` answers AS OF reads, `integrity` audits an
//! id's windows.

mod integrity;
mod reconstruct;
mod rows;
mod store;

use saga_core::models::{ContentBlock, KnowledgeSnapshot};

pub use store::VersionedStore;

/// Versioned narrative content blocks.
pub type ContentBlockStore<T = i64> = VersionedStore<ContentBlock, T>;

/// Versioned per-entity knowledge snapshots.
pub type KnowledgeSnapshotStore<T = i64> = VersionedStore<KnowledgeSnapshot, T>;
