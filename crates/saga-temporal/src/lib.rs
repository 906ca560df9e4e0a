//! # saga-temporal
//!
//! Bitemporal engine for saga.
//! System-time versioning with AS OF reconstruction for payload records,
//! and business-time interval queries for relationships.

pub mod engine;
pub mod interval;
pub mod locks;
pub mod relationships;
pub mod versioned;

pub use engine::SagaEngine;
pub use relationships::TemporalRelationshipStore;
pub use versioned::{ContentBlockStore, KnowledgeSnapshotStore, VersionedStore};
