//! SagaEngine: wires storage and the temporal stores from one config.

use std::sync::Arc;

use tracing::info;

use saga_core::config::SagaConfig;
use saga_core::errors::SagaResult;
use saga_core::models::{EntityKind, TimePoint};
use saga_storage::StorageEngine;

use crate::relationships::TemporalRelationshipStore;
use crate::versioned::{ContentBlockStore, KnowledgeSnapshotStore};

/// Explicit handle over one database. Hold it for as long as the stores
/// are in use; there is no global instance.
pub struct SagaEngine<T = i64> {
    storage: Arc<StorageEngine>,
    content_blocks: ContentBlockStore<T>,
    knowledge_snapshots: KnowledgeSnapshotStore<T>,
    relationships: TemporalRelationshipStore<T>,
    config: SagaConfig,
}

impl<T: TimePoint> SagaEngine<T> {
    /// Open storage (file-backed when `storage.db_path` is set, in-memory
    /// otherwise), run migrations and build the stores.
    pub fn open(config: SagaConfig) -> SagaResult<Self> {
        let storage = Arc::new(StorageEngine::from_config(&config.storage)?);
        info!(
            path = ?config.storage.db_path,
            lock_timeout_ms = config.temporal.lock_timeout_ms,
            write_timeout_ms = config.temporal.write_timeout_ms,
            "saga engine opened"
        );
        Ok(Self::with_storage(storage, config))
    }

    /// Private in-memory database with default config. It has no read
    /// pool: reads share the write connection and wait for an in-flight
    /// write, failing with a storage `WriterBusy` after `busy_timeout_ms`.
    pub fn open_in_memory() -> SagaResult<Self> {
        Self::open(SagaConfig::default())
    }

    /// Build the stores over an already-open storage engine.
    pub fn with_storage(storage: Arc<StorageEngine>, config: SagaConfig) -> Self {
        Self {
            content_blocks: ContentBlockStore::new(
                Arc::clone(&storage),
                EntityKind::ContentBlock,
                config.temporal.clone(),
            ),
            knowledge_snapshots: KnowledgeSnapshotStore::new(
                Arc::clone(&storage),
                EntityKind::KnowledgeSnapshot,
                config.temporal.clone(),
            ),
            relationships: TemporalRelationshipStore::new(Arc::clone(&storage)),
            storage,
            config,
        }
    }

    pub fn content_blocks(&self) -> &ContentBlockStore<T> {
        &self.content_blocks
    }

    pub fn knowledge_snapshots(&self) -> &KnowledgeSnapshotStore<T> {
        &self.knowledge_snapshots
    }

    pub fn relationships(&self) -> &TemporalRelationshipStore<T> {
        &self.relationships
    }

    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    pub fn config(&self) -> &SagaConfig {
        &self.config
    }
}
