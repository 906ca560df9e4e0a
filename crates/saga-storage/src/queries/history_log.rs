//! Append-only log of closed versions.
//!
//! Nothing here updates or deletes a row; the v001 triggers reject any
//! statement that tries.

use rusqlite::{params, Connection, OptionalExtension, Row};

use saga_core::errors::SagaResult;
use saga_core::models::EntityKind;

use crate::to_storage_err;

/// An archived version with the payload still serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHistoryRow {
    pub id: String,
    pub version: i64,
    pub payload: String,
    pub valid_from: i64,
    pub valid_to: i64,
    pub operation: String,
}

const COLUMNS: &str = "id, version, payload, valid_from, valid_to, operation";

fn row_to_history(row: &Row<'_>) -> rusqlite::Result<RawHistoryRow> {
    Ok(RawHistoryRow {
        id: row.get(0)?,
        version: row.get(1)?,
        payload: row.get(2)?,
        valid_from: row.get(3)?,
        valid_to: row.get(4)?,
        operation: row.get(5)?,
    })
}

/// Append one closed version. Returns the log's row id.
pub fn archive(conn: &Connection, kind: EntityKind, row: &RawHistoryRow) -> SagaResult<i64> {
    let sql = format!(
        "INSERT INTO {} ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        kind.history_table()
    );
    conn.execute(
        &sql,
        params![
            row.id,
            row.version,
            row.payload,
            row.valid_from,
            row.valid_to,
            row.operation,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

/// The version of `id` whose window `[valid_from, valid_to)` contains `at`.
pub fn find_covering(
    conn: &Connection,
    kind: EntityKind,
    id: &str,
    at: i64,
) -> SagaResult<Option<RawHistoryRow>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM {}
         WHERE id = ?1 AND valid_from <= ?2 AND valid_to > ?2
         ORDER BY version DESC
         LIMIT 1",
        kind.history_table()
    );
    conn.query_row(&sql, params![id, at], row_to_history)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Every archived version, across all ids, whose window contains `at`.
/// Ordered by id, newest version first within an id.
pub fn scan_covering(conn: &Connection, kind: EntityKind, at: i64) -> SagaResult<Vec<RawHistoryRow>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM {}
         WHERE valid_from <= ?1 AND valid_to > ?1
         ORDER BY id, version DESC",
        kind.history_table()
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![at], row_to_history)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// All archived versions of `id`, oldest window first.
pub fn history_for(conn: &Connection, kind: EntityKind, id: &str) -> SagaResult<Vec<RawHistoryRow>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM {}
         WHERE id = ?1
         ORDER BY valid_from, version",
        kind.history_table()
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![id], row_to_history)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// The highest-numbered archived version of `id`.
pub fn latest_for(conn: &Connection, kind: EntityKind, id: &str) -> SagaResult<Option<RawHistoryRow>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM {}
         WHERE id = ?1
         ORDER BY version DESC
         LIMIT 1",
        kind.history_table()
    );
    conn.query_row(&sql, params![id], row_to_history)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn count_for(conn: &Connection, kind: EntityKind, id: &str) -> SagaResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?1", kind.history_table());
    conn.query_row(&sql, params![id], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}
