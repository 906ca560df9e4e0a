//! Partition audit for one id.
//!
//! Within one incarnation (create up to delete) the archived windows,
//! followed by the live window, must tile time with no gap and no overlap.
//! A `Deleted` close ends an incarnation; the gap before a re-create is
//! expected.

use rusqlite::Connection;

use saga_core::errors::SagaResult;
use saga_core::models::{EntityKind, Operation, PartitionReport, TimePoint};
use saga_storage::queries::history_log::RawHistoryRow;
use saga_storage::queries::{history_log, live_table};

use super::reconstruct::in_snapshot;
use super::rows::{time_from_key, version_from_raw};

pub(crate) fn verify_partition<T: TimePoint>(
    conn: &Connection,
    kind: EntityKind,
    id: &str,
) -> SagaResult<PartitionReport<T>> {
    let (mut rows, live) = in_snapshot(conn, |conn| {
        Ok((
            history_log::history_for(conn, kind, id)?,
            live_table::get(conn, kind, id)?,
        ))
    })?;
    rows.sort_by_key(|r| r.version);

    let table = kind.history_table();
    let mut gaps = Vec::new();
    let mut overlaps = Vec::new();
    let mut inverted = Vec::new();

    for row in &rows {
        if row.valid_from > row.valid_to {
            inverted.push(version_from_raw(table, row.version)?);
        }
    }

    // Any two non-empty windows sharing a point.
    for (i, a) in rows.iter().enumerate() {
        for b in &rows[i + 1..] {
            if a.valid_from < a.valid_to
                && b.valid_from < b.valid_to
                && a.valid_from < b.valid_to
                && b.valid_from < a.valid_to
            {
                overlaps.push((version_from_raw(table, a.version)?, version_from_raw(table, b.version)?));
            }
        }
    }

    // Successive versions of one incarnation must meet exactly.
    let mut incarnation_start = 0;
    for (i, pair) in rows.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        if is_deleted(prev) {
            incarnation_start = i + 1;
            let pair = (version_from_raw(table, prev.version)?, version_from_raw(table, next.version)?);
            if next.valid_from < prev.valid_to && !overlaps.contains(&pair) {
                overlaps.push(pair);
            }
        } else if next.valid_from > prev.valid_to {
            gaps.push((time_from_key(table, prev.valid_to)?, time_from_key(table, next.valid_from)?));
        }
    }

    let mut missing_successor = false;
    let last = rows.last();
    match (&live, last) {
        (Some(live), Some(last)) if !is_deleted(last) => {
            let live_version = version_from_raw(kind.live_table(), live.version)?;
            let last_version = version_from_raw(table, last.version)?;
            if live.updated_at > last.valid_to {
                gaps.push((time_from_key(table, last.valid_to)?, time_from_key(table, live.updated_at)?));
            } else if live.updated_at < last.valid_to {
                overlaps.push((last_version, live_version));
            }
            let first = &rows[incarnation_start];
            if first.valid_from > live.created_at {
                gaps.push((time_from_key(table, live.created_at)?, time_from_key(table, first.valid_from)?));
            }
        }
        (Some(live), Some(last)) => {
            // Re-created after a delete: nothing archived yet for this incarnation.
            if live.created_at < last.valid_to {
                overlaps.push((
                    version_from_raw(table, last.version)?,
                    version_from_raw(kind.live_table(), live.version)?,
                ));
            }
            if live.updated_at > live.created_at {
                gaps.push((time_from_key(table, live.created_at)?, time_from_key(table, live.updated_at)?));
            }
        }
        (Some(live), None) => {
            if live.updated_at > live.created_at {
                gaps.push((time_from_key(table, live.created_at)?, time_from_key(table, live.updated_at)?));
            }
        }
        (None, Some(last)) => missing_successor = !is_deleted(last),
        (None, None) => {}
    }

    Ok(PartitionReport {
        id: id.to_string(),
        archived_versions: rows.len(),
        has_live: live.is_some(),
        gaps,
        overlaps,
        inverted,
        missing_successor,
    })
}

fn is_deleted(row: &RawHistoryRow) -> bool {
    Operation::parse(&row.operation) == Some(Operation::Deleted)
}
