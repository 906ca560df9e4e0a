//! Relationship interval rows.
//!
//! Bounds are stored as nullable INTEGER keys. The bound filters here are
//! inclusive prefilters; the exact half-open predicate is applied by the
//! caller.

use rusqlite::{params, Connection, OptionalExtension, Row};

use saga_core::errors::SagaResult;

use crate::{corrupt_row, to_storage_err};

const TABLE: &str = "relationships";

const COLUMNS: &str = "id, source_id, target_id, relation_kind, weight, \
                       starts_at, ends_at, metadata, created_at, updated_at";

/// A relationship row with bounds as storage keys and bookkeeping
/// timestamps as RFC 3339 text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRelationshipRow {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub relation_kind: String,
    pub weight: f64,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub metadata: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

/// Row as read, before the metadata text is decoded.
struct TextRow {
    row: RawRelationshipRow,
    metadata: String,
}

fn row_to_text(row: &Row<'_>) -> rusqlite::Result<TextRow> {
    Ok(TextRow {
        row: RawRelationshipRow {
            id: row.get(0)?,
            source_id: row.get(1)?,
            target_id: row.get(2)?,
            relation_kind: row.get(3)?,
            weight: row.get(4)?,
            starts_at: row.get(5)?,
            ends_at: row.get(6)?,
            metadata: serde_json::Value::Null,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        },
        metadata: row.get(7)?,
    })
}

fn decode(text: TextRow) -> SagaResult<RawRelationshipRow> {
    let TextRow { mut row, metadata } = text;
    row.metadata = serde_json::from_str(&metadata)
        .map_err(|e| corrupt_row(TABLE, format!("metadata of {}: {e}", row.id)))?;
    Ok(row)
}

fn query_many(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> SagaResult<Vec<RawRelationshipRow>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, row_to_text)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for text in rows {
        out.push(decode(text.map_err(|e| to_storage_err(e.to_string()))?)?);
    }
    Ok(out)
}

pub fn insert(conn: &Connection, row: &RawRelationshipRow) -> SagaResult<()> {
    let metadata = serde_json::to_string(&row.metadata)?;
    conn.execute(
        &format!("INSERT INTO {TABLE} ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
        params![
            row.id,
            row.source_id,
            row.target_id,
            row.relation_kind,
            row.weight,
            row.starts_at,
            row.ends_at,
            metadata,
            row.created_at,
            row.updated_at,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Overwrite every mutable column of an existing row in place.
/// Returns whether the row existed.
pub fn update(conn: &Connection, row: &RawRelationshipRow) -> SagaResult<bool> {
    let metadata = serde_json::to_string(&row.metadata)?;
    let changed = conn
        .execute(
            &format!(
                "UPDATE {TABLE} SET
                    relation_kind = ?2,
                    weight = ?3,
                    starts_at = ?4,
                    ends_at = ?5,
                    metadata = ?6,
                    updated_at = ?7
                 WHERE id = ?1"
            ),
            params![
                row.id,
                row.relation_kind,
                row.weight,
                row.starts_at,
                row.ends_at,
                metadata,
                row.updated_at,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(changed > 0)
}

pub fn delete(conn: &Connection, id: &str) -> SagaResult<bool> {
    let deleted = conn
        .execute(&format!("DELETE FROM {TABLE} WHERE id = ?1"), params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(deleted > 0)
}

pub fn get(conn: &Connection, id: &str) -> SagaResult<Option<RawRelationshipRow>> {
    let text = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = ?1"),
            params![id],
            row_to_text,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    text.map(decode).transpose()
}

/// Rows whose bounds could contain `at`.
pub fn candidates_at(conn: &Connection, at: i64) -> SagaResult<Vec<RawRelationshipRow>> {
    query_many(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM {TABLE}
             WHERE (starts_at IS NULL OR starts_at <= ?1)
               AND (ends_at IS NULL OR ends_at > ?1)
             ORDER BY starts_at, id"
        ),
        params![at],
    )
}

/// Rows whose bounds could intersect `[from, to]`.
pub fn candidates_overlapping(
    conn: &Connection,
    from: i64,
    to: i64,
) -> SagaResult<Vec<RawRelationshipRow>> {
    query_many(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM {TABLE}
             WHERE (starts_at IS NULL OR starts_at <= ?2)
               AND (ends_at IS NULL OR ends_at >= ?1)
             ORDER BY starts_at, id"
        ),
        params![from, to],
    )
}

/// Rows where `entity_id` is source or target.
pub fn for_entity(conn: &Connection, entity_id: &str) -> SagaResult<Vec<RawRelationshipRow>> {
    query_many(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM {TABLE}
             WHERE source_id = ?1 OR target_id = ?1
             ORDER BY starts_at, id"
        ),
        params![entity_id],
    )
}

/// Rows linking `a` and `b` in either direction.
pub fn between(conn: &Connection, a: &str, b: &str) -> SagaResult<Vec<RawRelationshipRow>> {
    query_many(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM {TABLE}
             WHERE (source_id = ?1 AND target_id = ?2)
                OR (source_id = ?2 AND target_id = ?1)
             ORDER BY starts_at, id"
        ),
        params![a, b],
    )
}

pub fn count(conn: &Connection) -> SagaResult<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}
