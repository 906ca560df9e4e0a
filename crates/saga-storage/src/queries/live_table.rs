//! Current-value rows, one per existing id.

use rusqlite::{params, Connection, OptionalExtension, Row};

use saga_core::errors::SagaResult;
use saga_core::models::EntityKind;

use crate::to_storage_err;

/// A live row with the payload still serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLiveRow {
    pub id: String,
    pub version: i64,
    pub payload: String,
    pub created_at: i64,
    pub updated_at: i64,
}

fn row_to_live(row: &Row<'_>) -> rusqlite::Result<RawLiveRow> {
    Ok(RawLiveRow {
        id: row.get(0)?,
        version: row.get(1)?,
        payload: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

pub fn get(conn: &Connection, kind: EntityKind, id: &str) -> SagaResult<Option<RawLiveRow>> {
    let sql = format!(
        "SELECT id, version, payload, created_at, updated_at FROM {} WHERE id = ?1",
        kind.live_table()
    );
    conn.query_row(&sql, params![id], row_to_live)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Insert a new row, or overwrite payload/version of an existing one and
/// refresh `updated_at`. `created_at` is only written on insert.
pub fn put(
    conn: &Connection,
    kind: EntityKind,
    id: &str,
    version: i64,
    payload: &str,
    now: i64,
) -> SagaResult<()> {
    let sql = format!(
        "INSERT INTO {} (id, version, payload, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)
         ON CONFLICT(id) DO UPDATE SET
            version = excluded.version,
            payload = excluded.payload,
            updated_at = excluded.updated_at",
        kind.live_table()
    );
    conn.execute(&sql, params![id, version, payload, now])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Remove a row. Returns whether one existed.
pub fn remove(conn: &Connection, kind: EntityKind, id: &str) -> SagaResult<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", kind.live_table());
    let deleted = conn
        .execute(&sql, params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(deleted > 0)
}

/// Rows created at or before `at`, ordered by id.
pub fn scan_created_by(conn: &Connection, kind: EntityKind, at: i64) -> SagaResult<Vec<RawLiveRow>> {
    let sql = format!(
        "SELECT id, version, payload, created_at, updated_at FROM {}
         WHERE created_at <= ?1
         ORDER BY id",
        kind.live_table()
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![at], row_to_live)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn count(conn: &Connection, kind: EntityKind) -> SagaResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", kind.live_table());
    conn.query_row(&sql, [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}
