//! Live table, history log and relationship row operations.

use rusqlite::Connection;
use serde_json::json;

use saga_core::errors::StorageError;
use saga_core::models::EntityKind;
use saga_core::SagaError;
use saga_storage::migrations;
use saga_storage::pool::pragmas;
use saga_storage::queries::history_log::{self, RawHistoryRow};
use saga_storage::queries::live_table;
use saga_storage::queries::relationship_ops::{self, RawRelationshipRow};

const BLOCKS: EntityKind = EntityKind::ContentBlock;

fn raw_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    pragmas::apply_pragmas(&conn).unwrap();
    migrations::run_migrations(&conn).unwrap();
    conn
}

fn history(id: &str, version: i64, from: i64, to: i64, op: &str) -> RawHistoryRow {
    RawHistoryRow {
        id: id.to_string(),
        version,
        payload: format!("\"p{version}\""),
        valid_from: from,
        valid_to: to,
        operation: op.to_string(),
    }
}

fn relationship(id: &str, starts_at: Option<i64>, ends_at: Option<i64>) -> RawRelationshipRow {
    RawRelationshipRow {
        id: id.to_string(),
        source_id: "alice".to_string(),
        target_id: "bob".to_string(),
        relation_kind: "ally".to_string(),
        weight: 1.0,
        starts_at,
        ends_at,
        metadata: json!({"note": id}),
        created_at: "2026-01-01T00:00:00Z".to_string(),
        updated_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

// ─── Live table ──────────────────────────────────────────────────────────────

#[test]
fn put_keeps_created_at_and_refreshes_updated_at() {
    let conn = raw_conn();
    live_table::put(&conn, BLOCKS, "b1", 1, "\"first\"", 100).unwrap();
    live_table::put(&conn, BLOCKS, "b1", 2, "\"second\"", 250).unwrap();

    let row = live_table::get(&conn, BLOCKS, "b1").unwrap().unwrap();
    assert_eq!(row.version, 2);
    assert_eq!(row.payload, "\"second\"");
    assert_eq!(row.created_at, 100);
    assert_eq!(row.updated_at, 250);
}

#[test]
fn remove_reports_whether_row_existed() {
    let conn = raw_conn();
    live_table::put(&conn, BLOCKS, "b1", 1, "null", 1).unwrap();
    assert!(live_table::remove(&conn, BLOCKS, "b1").unwrap());
    assert!(!live_table::remove(&conn, BLOCKS, "b1").unwrap());
    assert!(live_table::get(&conn, BLOCKS, "b1").unwrap().is_none());
}

#[test]
fn scan_created_by_filters_and_orders_by_id() {
    let conn = raw_conn();
    live_table::put(&conn, BLOCKS, "c", 1, "null", 10).unwrap();
    live_table::put(&conn, BLOCKS, "a", 1, "null", 30).unwrap();
    live_table::put(&conn, BLOCKS, "b", 1, "null", 20).unwrap();

    let ids: Vec<_> = live_table::scan_created_by(&conn, BLOCKS, 20)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["b", "c"]);
    assert_eq!(live_table::count(&conn, BLOCKS).unwrap(), 3);
}

#[test]
fn entity_kinds_use_separate_tables() {
    let conn = raw_conn();
    live_table::put(&conn, BLOCKS, "shared", 1, "null", 1).unwrap();
    assert!(live_table::get(&conn, EntityKind::KnowledgeSnapshot, "shared")
        .unwrap()
        .is_none());
}

// ─── History log ─────────────────────────────────────────────────────────────

#[test]
fn find_covering_uses_half_open_windows() {
    let conn = raw_conn();
    history_log::archive(&conn, BLOCKS, &history("b1", 1, 10, 20, "updated")).unwrap();
    history_log::archive(&conn, BLOCKS, &history("b1", 2, 20, 35, "deleted")).unwrap();

    assert!(history_log::find_covering(&conn, BLOCKS, "b1", 9).unwrap().is_none());
    assert_eq!(
        history_log::find_covering(&conn, BLOCKS, "b1", 10).unwrap().unwrap().version,
        1
    );
    assert_eq!(
        history_log::find_covering(&conn, BLOCKS, "b1", 20).unwrap().unwrap().version,
        2
    );
    assert!(history_log::find_covering(&conn, BLOCKS, "b1", 35).unwrap().is_none());
}

#[test]
fn zero_width_window_covers_nothing() {
    let conn = raw_conn();
    history_log::archive(&conn, BLOCKS, &history("b1", 1, 10, 10, "updated")).unwrap();
    assert!(history_log::find_covering(&conn, BLOCKS, "b1", 10).unwrap().is_none());
}

#[test]
fn scan_covering_spans_ids() {
    let conn = raw_conn();
    history_log::archive(&conn, BLOCKS, &history("b", 1, 0, 50, "updated")).unwrap();
    history_log::archive(&conn, BLOCKS, &history("a", 1, 10, 30, "deleted")).unwrap();
    history_log::archive(&conn, BLOCKS, &history("c", 1, 40, 60, "updated")).unwrap();

    let ids: Vec<_> = history_log::scan_covering(&conn, BLOCKS, 25)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn history_for_orders_by_window_start() {
    let conn = raw_conn();
    history_log::archive(&conn, BLOCKS, &history("b1", 2, 20, 30, "updated")).unwrap();
    history_log::archive(&conn, BLOCKS, &history("b1", 1, 10, 20, "updated")).unwrap();
    history_log::archive(&conn, BLOCKS, &history("b1", 3, 30, 40, "deleted")).unwrap();

    let versions: Vec<_> = history_log::history_for(&conn, BLOCKS, "b1")
        .unwrap()
        .into_iter()
        .map(|r| r.version)
        .collect();
    assert_eq!(versions, vec![1, 2, 3]);
    assert_eq!(
        history_log::latest_for(&conn, BLOCKS, "b1").unwrap().unwrap().operation,
        "deleted"
    );
}

// ─── Relationships ───────────────────────────────────────────────────────────

#[test]
fn relationship_round_trips_metadata_and_open_bounds() {
    let conn = raw_conn();
    let row = relationship("r1", None, Some(2000));
    relationship_ops::insert(&conn, &row).unwrap();
    assert_eq!(relationship_ops::get(&conn, "r1").unwrap(), Some(row));
}

#[test]
fn relationship_update_and_delete_report_existence() {
    let conn = raw_conn();
    let mut row = relationship("r1", Some(1000), Some(2000));
    assert!(!relationship_ops::update(&conn, &row).unwrap());

    relationship_ops::insert(&conn, &row).unwrap();
    row.ends_at = None;
    row.weight = 0.25;
    assert!(relationship_ops::update(&conn, &row).unwrap());

    let stored = relationship_ops::get(&conn, "r1").unwrap().unwrap();
    assert_eq!(stored.ends_at, None);
    assert_eq!(stored.weight, 0.25);

    assert!(relationship_ops::delete(&conn, "r1").unwrap());
    assert!(!relationship_ops::delete(&conn, "r1").unwrap());
}

#[test]
fn candidates_at_excludes_closed_upper_bound() {
    let conn = raw_conn();
    relationship_ops::insert(&conn, &relationship("r1", Some(1000), Some(2000))).unwrap();
    relationship_ops::insert(&conn, &relationship("r2", None, None)).unwrap();

    let at = |t| -> Vec<String> {
        relationship_ops::candidates_at(&conn, t)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect()
    };
    assert_eq!(at(999), vec!["r2"]);
    assert_eq!(at(1000), vec!["r2", "r1"]);
    assert_eq!(at(2000), vec!["r2"]);
}

#[test]
fn between_matches_either_direction() {
    let conn = raw_conn();
    let mut reversed = relationship("r2", None, None);
    reversed.source_id = "bob".to_string();
    reversed.target_id = "alice".to_string();
    let mut unrelated = relationship("r3", None, None);
    unrelated.target_id = "carol".to_string();

    relationship_ops::insert(&conn, &relationship("r1", None, None)).unwrap();
    relationship_ops::insert(&conn, &reversed).unwrap();
    relationship_ops::insert(&conn, &unrelated).unwrap();

    assert_eq!(relationship_ops::between(&conn, "alice", "bob").unwrap().len(), 2);
    assert_eq!(relationship_ops::for_entity(&conn, "carol").unwrap().len(), 1);
    assert_eq!(relationship_ops::count(&conn).unwrap(), 3);
}

#[test]
fn malformed_metadata_is_reported_as_corrupt_row() {
    let conn = raw_conn();
    conn.execute(
        "INSERT INTO relationships
            (id, source_id, target_id, relation_kind, metadata, created_at, updated_at)
         VALUES ('bad', 'a', 'b', 'ally', '{not json', 'x', 'x')",
        [],
    )
    .unwrap();

    let err = relationship_ops::get(&conn, "bad").unwrap_err();
    assert!(matches!(
        err,
        SagaError::StorageError(StorageError::CorruptRow { .. })
    ));
}
