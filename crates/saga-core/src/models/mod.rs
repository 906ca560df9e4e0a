//! Record models shared by storage and the temporal engine.

mod entity_kind;
mod interval;
mod story;
mod time_point;
mod versioned;

pub use entity_kind::EntityKind;
pub use interval::{
    IntervalRecord, NewRelationship, RelationshipGraph, RelationshipOp, RelationshipOpOutcome,
    RelationshipUpdate,
};
pub use story::{BlockType, ContentBlock, KnowledgeSnapshot};
pub use time_point::TimePoint;
pub use versioned::{
    AsOfRecord, LiveRecord, Operation, PartitionReport, RecordSource, VersionId, VersionedRecord,
};
