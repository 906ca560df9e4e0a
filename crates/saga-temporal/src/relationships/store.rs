//! TemporalRelationshipStore: relationships valid over caller-supplied
//! `[starts_at, ends_at)` intervals.
//!
//! Bounds are edited in place. There is no version history here; that is
//! what `VersionedStore` is for.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use saga_core::errors::{SagaError, SagaResult, StorageError};
use saga_core::models::{
    IntervalRecord, NewRelationship, RelationshipGraph, RelationshipOp, RelationshipOpOutcome,
    RelationshipUpdate, TimePoint,
};
use saga_core::traits::IRelationshipStore;
use saga_storage::queries::relationship_ops::{self, RawRelationshipRow};
use saga_storage::StorageEngine;

use super::graph;
use crate::interval;

const TABLE: &str = "relationships";

pub struct TemporalRelationshipStore<T = i64> {
    storage: Arc<StorageEngine>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: TimePoint> TemporalRelationshipStore<T> {
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self {
            storage,
            _marker: PhantomData,
        }
    }
}

fn corrupt(reason: String) -> SagaError {
    SagaError::StorageError(StorageError::CorruptRow {
        table: TABLE.to_string(),
        reason,
    })
}

fn parse_timestamp(id: &str, raw: &str) -> SagaResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt(format!("timestamp of {id}: {e}")))
}

fn bound_from_key<T: TimePoint>(id: &str, key: Option<i64>) -> SagaResult<Option<T>> {
    key.map(|k| T::from_key(k).ok_or_else(|| corrupt(format!("bound {k} of {id} out of range"))))
        .transpose()
}

pub(crate) fn decode<T: TimePoint>(row: RawRelationshipRow) -> SagaResult<IntervalRecord<T>> {
    Ok(IntervalRecord {
        starts_at: bound_from_key(&row.id, row.starts_at)?,
        ends_at: bound_from_key(&row.id, row.ends_at)?,
        created_at: parse_timestamp(&row.id, &row.created_at)?,
        updated_at: parse_timestamp(&row.id, &row.updated_at)?,
        id: row.id,
        source_id: row.source_id,
        target_id: row.target_id,
        relation_kind: row.relation_kind,
        weight: row.weight,
        metadata: row.metadata,
    })
}

fn encode<T: TimePoint>(record: &IntervalRecord<T>) -> RawRelationshipRow {
    RawRelationshipRow {
        id: record.id.clone(),
        source_id: record.source_id.clone(),
        target_id: record.target_id.clone(),
        relation_kind: record.relation_kind.clone(),
        weight: record.weight,
        starts_at: record.starts_at.map(TimePoint::to_key),
        ends_at: record.ends_at.map(TimePoint::to_key),
        metadata: record.metadata.clone(),
        created_at: record.created_at.to_rfc3339(),
        updated_at: record.updated_at.to_rfc3339(),
    }
}

fn validate_weight(weight: f64) -> SagaResult<()> {
    if !(0.0..=1.0).contains(&weight) {
        return Err(SagaError::ValidationError(format!(
            "weight must be within [0.0, 1.0], got {weight}"
        )));
    }
    Ok(())
}

fn validate_required(field: &str, value: &str) -> SagaResult<()> {
    if value.trim().is_empty() {
        return Err(SagaError::ValidationError(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate<T: TimePoint>(record: &IntervalRecord<T>) -> SagaResult<()> {
    validate_required("source_id", &record.source_id)?;
    validate_required("target_id", &record.target_id)?;
    validate_required("relation_kind", &record.relation_kind)?;
    validate_weight(record.weight)?;
    interval::validate_bounds(record.starts_at.as_ref(), record.ends_at.as_ref())
}

fn decode_all<T: TimePoint>(rows: Vec<RawRelationshipRow>) -> SagaResult<Vec<IntervalRecord<T>>> {
    rows.into_iter().map(decode).collect()
}

fn active_filter<T: TimePoint>(
    records: Vec<IntervalRecord<T>>,
    at: Option<T>,
) -> Vec<IntervalRecord<T>> {
    match at {
        Some(at) => records
            .into_iter()
            .filter(|r| interval::contains(at, r.starts_at, r.ends_at))
            .collect(),
        None => records,
    }
}

impl<T: TimePoint> IRelationshipStore<T> for TemporalRelationshipStore<T> {
    fn create(&self, relationship: NewRelationship<T>) -> SagaResult<IntervalRecord<T>> {
        let now = Utc::now();
        let record = IntervalRecord {
            id: uuid::Uuid::new_v4().to_string(),
            source_id: relationship.source_id,
            target_id: relationship.target_id,
            relation_kind: relationship.relation_kind,
            weight: relationship.weight,
            starts_at: relationship.starts_at,
            ends_at: relationship.ends_at,
            metadata: relationship.metadata,
            created_at: now,
            updated_at: now,
        };
        validate(&record)?;

        let row = encode(&record);
        self.storage.with_tx(|tx| relationship_ops::insert(tx, &row))?;
        debug!(
            id = %record.id,
            source = %record.source_id,
            target = %record.target_id,
            kind = %record.relation_kind,
            "relationship created"
        );
        Ok(record)
    }

    fn update(&self, id: &str, changes: RelationshipUpdate<T>) -> SagaResult<IntervalRecord<T>> {
        if changes.is_empty() {
            return Err(SagaError::ValidationError("no fields to update".to_string()));
        }

        let record = self.storage.with_tx(|tx| {
            let current = relationship_ops::get(tx, id)?.ok_or_else(|| SagaError::not_found(id))?;
            let mut record = decode::<T>(current)?;

            if let Some(kind) = changes.relation_kind {
                record.relation_kind = kind;
            }
            if let Some(weight) = changes.weight {
                record.weight = weight;
            }
            if let Some(starts_at) = changes.starts_at {
                record.starts_at = starts_at;
            }
            if let Some(ends_at) = changes.ends_at {
                record.ends_at = ends_at;
            }
            if let Some(metadata) = changes.metadata {
                record.metadata = metadata;
            }
            record.updated_at = Utc::now();
            validate(&record)?;

            relationship_ops::update(tx, &encode(&record))?;
            Ok(record)
        })?;

        debug!(id, "relationship updated");
        Ok(record)
    }

    fn delete(&self, id: &str) -> SagaResult<()> {
        let existed = self.storage.with_tx(|tx| relationship_ops::delete(tx, id))?;
        if !existed {
            return Err(SagaError::not_found(id));
        }
        debug!(id, "relationship deleted");
        Ok(())
    }

    fn get(&self, id: &str) -> SagaResult<Option<IntervalRecord<T>>> {
        self.storage
            .with_reader(|conn| relationship_ops::get(conn, id)?.map(decode).transpose())
    }

    fn active_at(&self, at: T) -> SagaResult<Vec<IntervalRecord<T>>> {
        let rows = self
            .storage
            .with_reader(|conn| relationship_ops::candidates_at(conn, at.to_key()))?;
        Ok(active_filter(decode_all(rows)?, Some(at)))
    }

    fn overlapping(&self, from: T, to: T) -> SagaResult<Vec<IntervalRecord<T>>> {
        interval::validate_range(&from, &to)?;
        if from == to {
            return Ok(Vec::new());
        }

        let rows = self.storage.with_reader(|conn| {
            relationship_ops::candidates_overlapping(conn, from.to_key(), to.to_key())
        })?;
        Ok(decode_all(rows)?
            .into_iter()
            .filter(|r| interval::overlaps(r.starts_at, r.ends_at, Some(from), Some(to)))
            .collect())
    }

    fn for_entity(&self, entity_id: &str, at: Option<T>) -> SagaResult<Vec<IntervalRecord<T>>> {
        let rows = self
            .storage
            .with_reader(|conn| relationship_ops::for_entity(conn, entity_id))?;
        Ok(active_filter(decode_all(rows)?, at))
    }

    fn between(&self, a: &str, b: &str, at: Option<T>) -> SagaResult<Vec<IntervalRecord<T>>> {
        let rows = self
            .storage
            .with_reader(|conn| relationship_ops::between(conn, a, b))?;
        Ok(active_filter(decode_all(rows)?, at))
    }

    fn neighborhood(
        &self,
        entity_id: &str,
        at: Option<T>,
        max_depth: usize,
    ) -> SagaResult<RelationshipGraph<T>> {
        self.storage.with_reader(|conn| {
            graph::neighborhood(entity_id, at, max_depth, |id| {
                let rows = relationship_ops::for_entity(conn, id)?;
                Ok(active_filter(decode_all(rows)?, at))
            })
        })
    }

    fn apply_batch(
        &self,
        ops: Vec<RelationshipOp<T>>,
    ) -> Vec<SagaResult<RelationshipOpOutcome<T>>> {
        ops.into_iter()
            .map(|op| match op {
                RelationshipOp::Create(new) => self.create(new).map(RelationshipOpOutcome::Created),
                RelationshipOp::Update { id, changes } => {
                    self.update(&id, changes).map(RelationshipOpOutcome::Updated)
                }
                RelationshipOp::Delete { id } => {
                    self.delete(&id).map(|()| RelationshipOpOutcome::Deleted { id })
                }
            })
            .collect()
    }
}
