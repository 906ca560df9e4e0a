//! AS OF reconstruction: merge the history log with the live table.
//!
//! A history window that contains the instant wins; otherwise the live row
//! answers if it was created by then. Both tables are read inside one read
//! transaction so a concurrent transition is seen entirely or not at all.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::de::DeserializeOwned;

use saga_core::errors::SagaResult;
use saga_core::models::{AsOfRecord, EntityKind, TimePoint};
use saga_storage::queries::{history_log, live_table};
use saga_storage::to_storage_err;

use super::rows::{decode_history, decode_live};

/// Run `f` inside a deferred read transaction.
pub(crate) fn in_snapshot<R>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> SagaResult<R>,
) -> SagaResult<R> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("begin read: {e}")))?;
    let out = f(&tx)?;
    tx.commit()
        .map_err(|e| to_storage_err(format!("end read: {e}")))?;
    Ok(out)
}

/// The record `id` held at `at`, or `None` if it did not exist then.
pub(crate) fn as_of<P, T>(
    conn: &Connection,
    kind: EntityKind,
    id: &str,
    at: T,
) -> SagaResult<Option<AsOfRecord<P, T>>>
where
    P: DeserializeOwned,
    T: TimePoint,
{
    let key = at.to_key();
    in_snapshot(conn, |conn| {
        if let Some(row) = history_log::find_covering(conn, kind, id, key)? {
            return Ok(Some(decode_history::<P, T>(kind, row)?.into()));
        }

        match live_table::get(conn, kind, id)? {
            Some(row) if row.created_at <= key => Ok(Some(decode_live::<P, T>(kind, row)?.into())),
            _ => Ok(None),
        }
    })
}

/// Every record that existed at `at`, one per id, ordered by id.
pub(crate) fn scan_as_of<P, T>(
    conn: &Connection,
    kind: EntityKind,
    at: T,
) -> SagaResult<Vec<AsOfRecord<P, T>>>
where
    P: DeserializeOwned,
    T: TimePoint,
{
    let key = at.to_key();
    in_snapshot(conn, |conn| {
        let mut by_id: BTreeMap<String, AsOfRecord<P, T>> = BTreeMap::new();

        // Newest version first within an id.
        for row in history_log::scan_covering(conn, kind, key)? {
            if !by_id.contains_key(&row.id) {
                let record = decode_history::<P, T>(kind, row)?;
                by_id.insert(record.id.clone(), record.into());
            }
        }

        for row in live_table::scan_created_by(conn, kind, key)? {
            if !by_id.contains_key(&row.id) {
                let record = decode_live::<P, T>(kind, row)?;
                by_id.insert(record.id.clone(), record.into());
            }
        }

        Ok(by_id.into_values().collect())
    })
}
