//! v001: live + history tables for every versioned entity kind.

use rusqlite::Connection;

use saga_core::errors::SagaResult;
use saga_core::models::EntityKind;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> SagaResult<()> {
    for kind in EntityKind::ALL {
        conn.execute_batch(&ddl(kind))
            .map_err(|e| to_storage_err(format!("{kind} tables: {e}")))?;
    }
    Ok(())
}

/// Both tables share one layout per kind. History rows are guarded by
/// triggers so no statement can rewrite or drop an archived window.
fn ddl(kind: EntityKind) -> String {
    let live = kind.live_table();
    let history = kind.history_table();
    format!(
        "
        CREATE TABLE IF NOT EXISTS {live} (
            id         TEXT PRIMARY KEY,
            version    INTEGER NOT NULL CHECK (version >= 1),
            payload    TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            CHECK (created_at <= updated_at)
        );

        CREATE INDEX IF NOT EXISTS idx_{live}_created
            ON {live}(created_at);

        CREATE TABLE IF NOT EXISTS {history} (
            history_id  INTEGER PRIMARY KEY AUTOINCREMENT,
            id          TEXT NOT NULL,
            version     INTEGER NOT NULL CHECK (version >= 1),
            payload     TEXT NOT NULL,
            valid_from  INTEGER NOT NULL,
            valid_to    INTEGER NOT NULL,
            operation   TEXT NOT NULL CHECK (operation IN ('updated', 'deleted')),
            archived_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            CHECK (valid_from <= valid_to),
            UNIQUE (id, version)
        );

        CREATE INDEX IF NOT EXISTS idx_{history}_id_from
            ON {history}(id, valid_from);
        CREATE INDEX IF NOT EXISTS idx_{history}_window
            ON {history}(valid_from, valid_to);

        CREATE TRIGGER IF NOT EXISTS trg_{history}_no_update
            BEFORE UPDATE ON {history}
        BEGIN
            SELECT RAISE(ABORT, '{history} is append-only');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_{history}_no_delete
            BEFORE DELETE ON {history}
        BEGIN
            SELECT RAISE(ABORT, '{history} is append-only');
        END;
        "
    )
}
