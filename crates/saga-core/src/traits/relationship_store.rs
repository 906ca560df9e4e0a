//! IRelationshipStore: the business-time interval surface.

use crate::errors::SagaResult;
use crate::models::{
    IntervalRecord, NewRelationship, RelationshipGraph, RelationshipOp, RelationshipOpOutcome,
    RelationshipUpdate, TimePoint,
};

/// Relationships whose validity is a caller-supplied `[starts_at, ends_at)`.
pub trait IRelationshipStore<T: TimePoint>: Send + Sync {
    fn create(&self, relationship: NewRelationship<T>) -> SagaResult<IntervalRecord<T>>;
    fn update(&self, id: &str, changes: RelationshipUpdate<T>) -> SagaResult<IntervalRecord<T>>;
    fn delete(&self, id: &str) -> SagaResult<()>;
    fn get(&self, id: &str) -> SagaResult<Option<IntervalRecord<T>>>;

    /// Relationships whose interval contains `at`.
    fn active_at(&self, at: T) -> SagaResult<Vec<IntervalRecord<T>>>;
    /// Relationships whose interval intersects `[from, to)`.
    fn overlapping(&self, from: T, to: T) -> SagaResult<Vec<IntervalRecord<T>>>;

    fn for_entity(&self, entity_id: &str, at: Option<T>) -> SagaResult<Vec<IntervalRecord<T>>>;
    fn between(&self, a: &str, b: &str, at: Option<T>) -> SagaResult<Vec<IntervalRecord<T>>>;
    fn neighborhood(
        &self,
        entity_id: &str,
        at: Option<T>,
        max_depth: usize,
    ) -> SagaResult<RelationshipGraph<T>>;

    /// Applies each op in order. Not atomic as a group.
    fn apply_batch(&self, ops: Vec<RelationshipOp<T>>) -> Vec<SagaResult<RelationshipOpOutcome<T>>>;
}
