//! v002: business-time relationship intervals.

use rusqlite::Connection;

use saga_core::errors::SagaResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> SagaResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS relationships (
            id            TEXT PRIMARY KEY,
            source_id     TEXT NOT NULL,
            target_id     TEXT NOT NULL,
            relation_kind TEXT NOT NULL,
            weight        REAL NOT NULL DEFAULT 1.0 CHECK (weight >= 0.0 AND weight <= 1.0),
            starts_at     INTEGER,
            ends_at       INTEGER,
            metadata      TEXT NOT NULL DEFAULT 'null',
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL,
            CHECK (starts_at IS NULL OR ends_at IS NULL OR starts_at <= ends_at)
        );

        CREATE INDEX IF NOT EXISTS idx_relationships_bounds
            ON relationships(starts_at, ends_at);
        CREATE INDEX IF NOT EXISTS idx_relationships_source
            ON relationships(source_id);
        CREATE INDEX IF NOT EXISTS idx_relationships_target
            ON relationships(target_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
