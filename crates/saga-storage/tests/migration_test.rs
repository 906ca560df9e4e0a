//! Schema: migrations, append-only history, table constraints.

use rusqlite::{params, Connection};

use saga_core::config::StorageConfig;
use saga_core::models::EntityKind;
use saga_storage::migrations::{self, LATEST_VERSION};
use saga_storage::pool::pragmas;
use saga_storage::queries::history_log::{self, RawHistoryRow};
use saga_storage::StorageEngine;

fn raw_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    pragmas::apply_pragmas(&conn).unwrap();
    migrations::run_migrations(&conn).unwrap();
    conn
}

fn closed_row(id: &str, version: i64, from: i64, to: i64) -> RawHistoryRow {
    RawHistoryRow {
        id: id.to_string(),
        version,
        payload: format!("{{\"v\":{version}}}"),
        valid_from: from,
        valid_to: to,
        operation: "updated".to_string(),
    }
}

#[test]
fn fresh_database_reaches_latest_version() {
    let engine = StorageEngine::open_in_memory().unwrap();
    assert_eq!(engine.schema_version().unwrap(), LATEST_VERSION);
}

#[test]
fn migrations_are_idempotent_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saga.db");
    let config = StorageConfig::default();

    drop(StorageEngine::open(&path, &config).unwrap());
    let engine = StorageEngine::open(&path, &config).unwrap();
    assert_eq!(engine.schema_version().unwrap(), LATEST_VERSION);

    let applied = engine
        .with_writer(migrations::run_migrations)
        .unwrap();
    assert_eq!(applied, 0);
}

#[test]
fn all_tables_exist() {
    let conn = raw_conn();
    let mut expected = vec!["schema_version", "relationships"];
    for kind in EntityKind::ALL {
        expected.push(kind.live_table());
        expected.push(kind.history_table());
    }

    for table in expected {
        let exists: bool = conn
            .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1")
            .unwrap()
            .exists([table])
            .unwrap();
        assert!(exists, "missing table {table}");
    }
}

#[test]
fn history_rows_cannot_be_updated() {
    let conn = raw_conn();
    let kind = EntityKind::ContentBlock;
    history_log::archive(&conn, kind, &closed_row("b1", 1, 10, 20)).unwrap();

    let err = conn
        .execute(
            &format!("UPDATE {} SET valid_to = 99 WHERE id = 'b1'", kind.history_table()),
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("append-only"), "{err}");

    let row = history_log::latest_for(&conn, kind, "b1").unwrap().unwrap();
    assert_eq!(row.valid_to, 20);
}

#[test]
fn history_rows_cannot_be_deleted() {
    let conn = raw_conn();
    let kind = EntityKind::KnowledgeSnapshot;
    history_log::archive(&conn, kind, &closed_row("k1", 1, 10, 20)).unwrap();

    assert!(conn
        .execute(&format!("DELETE FROM {}", kind.history_table()), [])
        .is_err());
    assert_eq!(history_log::count_for(&conn, kind, "k1").unwrap(), 1);
}

#[test]
fn inverted_history_window_is_rejected() {
    let conn = raw_conn();
    let result = history_log::archive(&conn, EntityKind::ContentBlock, &closed_row("b1", 1, 20, 10));
    assert!(result.is_err());
}

#[test]
fn duplicate_history_version_is_rejected() {
    let conn = raw_conn();
    let kind = EntityKind::ContentBlock;
    history_log::archive(&conn, kind, &closed_row("b1", 1, 10, 20)).unwrap();
    assert!(history_log::archive(&conn, kind, &closed_row("b1", 1, 20, 30)).is_err());
}

#[test]
fn unknown_operation_is_rejected() {
    let conn = raw_conn();
    let mut row = closed_row("b1", 1, 10, 20);
    row.operation = "rewritten".to_string();
    assert!(history_log::archive(&conn, EntityKind::ContentBlock, &row).is_err());
}

#[test]
fn relationship_weight_out_of_range_is_rejected() {
    let conn = raw_conn();
    let result = conn.execute(
        "INSERT INTO relationships
            (id, source_id, target_id, relation_kind, weight, created_at, updated_at)
         VALUES (?1, 'a', 'b', 'ally', 1.5, 'now', 'now')",
        params!["r1"],
    );
    assert!(result.is_err());
}
