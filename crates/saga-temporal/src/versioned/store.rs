//! VersionedStore: live table plus append-only history for one entity kind.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use rusqlite::Transaction;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use saga_core::config::TemporalConfig;
use saga_core::errors::{SagaError, SagaResult, StorageError};
use saga_core::models::{
    AsOfRecord, EntityKind, LiveRecord, Operation, PartitionReport, TimePoint, VersionId,
    VersionedRecord,
};
use saga_core::traits::IVersionedStore;
use saga_storage::queries::history_log::{self, RawHistoryRow};
use saga_storage::queries::live_table;
use saga_storage::StorageEngine;

use super::rows::{decode_history, decode_live, version_from_raw, version_to_raw};
use super::{integrity, reconstruct};
use crate::locks::KeyLocks;

/// Versioned records of one entity kind, with payload `P` and instants `T`.
///
/// Every `update` and `delete` closes the current version into the history
/// log with `valid_to = now` and mutates the live row, in one transaction
/// under the id's lock. Windows are never edited after they are archived.
pub struct VersionedStore<P, T = i64> {
    storage: Arc<StorageEngine>,
    kind: EntityKind,
    locks: KeyLocks,
    config: TemporalConfig,
    _marker: PhantomData<fn() -> (P, T)>,
}

impl<P, T> VersionedStore<P, T>
where
    P: Serialize + DeserializeOwned,
    T: TimePoint,
{
    pub fn new(storage: Arc<StorageEngine>, kind: EntityKind, config: TemporalConfig) -> Self {
        Self {
            locks: KeyLocks::new(config.lock_timeout()),
            storage,
            kind,
            config,
            _marker: PhantomData,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Take the id lock, then run `f` in one write transaction bounded by
    /// the write timeout.
    fn write<R>(
        &self,
        id: &str,
        op: &'static str,
        f: impl FnOnce(&Transaction<'_>) -> SagaResult<R>,
    ) -> SagaResult<R> {
        let deadline = Instant::now() + self.config.write_timeout();
        self.locks.with_lock(id, || {
            self.storage
                .with_tx_until(deadline, f)
                .map_err(|e| match e {
                    SagaError::StorageError(StorageError::WriterBusy { waited_ms }) => {
                        warn!(kind = %self.kind, id, op, waited_ms, "write connection busy");
                        SagaError::concurrent(id, format!("{op}: write connection busy for {waited_ms}ms"))
                    }
                    SagaError::StorageError(StorageError::DeadlineExceeded { elapsed_ms }) => {
                        SagaError::concurrent(id, format!("{op}: rolled back after {elapsed_ms}ms"))
                    }
                    other => other,
                })
        })
    }

    /// Close the live version at `now`. Returns the closed version.
    fn archive_live(
        &self,
        tx: &Transaction<'_>,
        id: &str,
        now: T,
        operation: Operation,
    ) -> SagaResult<VersionId> {
        let live = live_table::get(tx, self.kind, id)?.ok_or_else(|| SagaError::not_found(id))?;
        let now_key = now.to_key();
        if now_key < live.updated_at {
            return Err(SagaError::InvalidInterval(format!(
                "{id}: transition at {now:?} precedes the live version's start"
            )));
        }

        let version = version_from_raw(self.kind.live_table(), live.version)?;
        history_log::archive(
            tx,
            self.kind,
            &RawHistoryRow {
                id: live.id,
                version: live.version,
                payload: live.payload,
                valid_from: live.updated_at,
                valid_to: now_key,
                operation: operation.as_str().to_string(),
            },
        )?;

        debug!(
            kind = %self.kind,
            id,
            %version,
            valid_from = live.updated_at,
            valid_to = now_key,
            operation = operation.as_str(),
            "archived version"
        );
        Ok(version)
    }
}

impl<P, T> IVersionedStore<P, T> for VersionedStore<P, T>
where
    P: Serialize + DeserializeOwned,
    T: TimePoint,
{
    fn create(&self, id: &str, payload: P, now: T) -> SagaResult<VersionId> {
        let payload = serde_json::to_string(&payload)?;
        let now_key = now.to_key();

        self.write(id, "create", |tx| {
            if live_table::get(tx, self.kind, id)?.is_some() {
                return Err(SagaError::already_exists(id));
            }

            // A re-create continues numbering after the last incarnation.
            let version = match history_log::latest_for(tx, self.kind, id)? {
                Some(prev) => {
                    if now_key < prev.valid_to {
                        return Err(SagaError::InvalidInterval(format!(
                            "{id}: re-create at {now:?} precedes the end of its previous incarnation"
                        )));
                    }
                    version_from_raw(self.kind.history_table(), prev.version)?.next()
                }
                None => VersionId::FIRST,
            };

            live_table::put(tx, self.kind, id, version_to_raw(version)?, &payload, now_key)?;
            debug!(kind = %self.kind, id, %version, created_at = now_key, "created");
            Ok(version)
        })
    }

    fn update(&self, id: &str, payload: P, now: T) -> SagaResult<VersionId> {
        let payload = serde_json::to_string(&payload)?;

        self.write(id, "update", |tx| {
            let closed = self.archive_live(tx, id, now, Operation::Updated)?;
            let version = closed.next();
            live_table::put(tx, self.kind, id, version_to_raw(version)?, &payload, now.to_key())?;
            debug!(kind = %self.kind, id, %version, "updated");
            Ok(version)
        })
    }

    fn delete(&self, id: &str, now: T) -> SagaResult<()> {
        self.write(id, "delete", |tx| {
            let closed = self.archive_live(tx, id, now, Operation::Deleted)?;
            live_table::remove(tx, self.kind, id)?;
            debug!(kind = %self.kind, id, version = %closed, "deleted");
            Ok(())
        })
    }

    fn as_of(&self, id: &str, at: T) -> SagaResult<Option<AsOfRecord<P, T>>> {
        self.storage
            .with_reader(|conn| reconstruct::as_of(conn, self.kind, id, at))
    }

    fn scan_as_of(&self, at: T) -> SagaResult<Vec<AsOfRecord<P, T>>> {
        self.storage
            .with_reader(|conn| reconstruct::scan_as_of(conn, self.kind, at))
    }

    fn get(&self, id: &str) -> SagaResult<Option<LiveRecord<P, T>>> {
        self.storage.with_reader(|conn| {
            live_table::get(conn, self.kind, id)?
                .map(|row| decode_live(self.kind, row))
                .transpose()
        })
    }

    fn history(&self, id: &str) -> SagaResult<Vec<VersionedRecord<P, T>>> {
        self.storage.with_reader(|conn| {
            history_log::history_for(conn, self.kind, id)?
                .into_iter()
                .map(|row| decode_history(self.kind, row))
                .collect()
        })
    }

    fn verify_partition(&self, id: &str) -> SagaResult<PartitionReport<T>> {
        self.storage
            .with_reader(|conn| integrity::verify_partition(conn, self.kind, id))
    }
}

impl<P, T> fmt::Debug for VersionedStore<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedStore")
            .field("kind", &self.kind)
            .field("locked_ids", &self.locks.len())
            .finish()
    }
}
