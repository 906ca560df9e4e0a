//! Decoding raw storage rows into typed records.

use serde::de::DeserializeOwned;

use saga_core::errors::{SagaError, SagaResult, StorageError};
use saga_core::models::{EntityKind, LiveRecord, Operation, TimePoint, VersionId, VersionedRecord};
use saga_storage::queries::history_log::RawHistoryRow;
use saga_storage::queries::live_table::RawLiveRow;

fn corrupt(table: &str, reason: String) -> SagaError {
    SagaError::StorageError(StorageError::CorruptRow {
        table: table.to_string(),
        reason,
    })
}

pub(crate) fn time_from_key<T: TimePoint>(table: &str, key: i64) -> SagaResult<T> {
    T::from_key(key).ok_or_else(|| corrupt(table, format!("time key {key} out of range")))
}

pub(crate) fn version_from_raw(table: &str, raw: i64) -> SagaResult<VersionId> {
    u64::try_from(raw)
        .ok()
        .filter(|v| *v >= VersionId::FIRST.value())
        .map(VersionId)
        .ok_or_else(|| corrupt(table, format!("invalid version {raw}")))
}

pub(crate) fn version_to_raw(version: VersionId) -> SagaResult<i64> {
    i64::try_from(version.value())
        .map_err(|_| SagaError::ValidationError(format!("version {version} exceeds storage range")))
}

pub(crate) fn decode_live<P, T>(kind: EntityKind, row: RawLiveRow) -> SagaResult<LiveRecord<P, T>>
where
    P: DeserializeOwned,
    T: TimePoint,
{
    let table = kind.live_table();
    Ok(LiveRecord {
        version: version_from_raw(table, row.version)?,
        payload: serde_json::from_str(&row.payload)?,
        created_at: time_from_key(table, row.created_at)?,
        updated_at: time_from_key(table, row.updated_at)?,
        id: row.id,
    })
}

pub(crate) fn decode_history<P, T>(
    kind: EntityKind,
    row: RawHistoryRow,
) -> SagaResult<VersionedRecord<P, T>>
where
    P: DeserializeOwned,
    T: TimePoint,
{
    let table = kind.history_table();
    let operation = Operation::parse(&row.operation)
        .ok_or_else(|| corrupt(table, format!("unknown operation '{}'", row.operation)))?;
    Ok(VersionedRecord {
        version: version_from_raw(table, row.version)?,
        payload: serde_json::from_str(&row.payload)?,
        valid_from: time_from_key(table, row.valid_from)?,
        valid_to: time_from_key(table, row.valid_to)?,
        operation,
        id: row.id,
    })
}
