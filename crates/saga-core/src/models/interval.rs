//! Business-time relationship intervals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A relationship between two entities, asserted true over
/// `[starts_at, ends_at)` in story time.
///
/// `starts_at = None` means "true since the beginning"; `ends_at = None`
/// means "still active". Bounds are caller-authored and edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRecord<T> {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub relation_kind: String,
    pub weight: f64,
    pub starts_at: Option<T>,
    pub ends_at: Option<T>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<T> IntervalRecord<T> {
    /// True if `entity_id` is either endpoint.
    pub fn touches(&self, entity_id: &str) -> bool {
        self.source_id == entity_id || self.target_id == entity_id
    }

    /// The endpoint opposite `entity_id`, if `entity_id` is an endpoint.
    pub fn other_end(&self, entity_id: &str) -> Option<&str> {
        if self.source_id == entity_id {
            Some(&self.target_id)
        } else if self.target_id == entity_id {
            Some(&self.source_id)
        } else {
            None
        }
    }
}

/// Input for creating a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct NewRelationship<T> {
    pub source_id: String,
    pub target_id: String,
    pub relation_kind: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub starts_at: Option<T>,
    #[serde(default)]
    pub ends_at: Option<T>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

fn default_weight() -> f64 {
    1.0
}

impl<T> NewRelationship<T> {
    /// An unbounded relationship with weight 1.0.
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relation_kind: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation_kind: relation_kind.into(),
            weight: default_weight(),
            starts_at: None,
            ends_at: None,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_bounds(mut self, starts_at: Option<T>, ends_at: Option<T>) -> Self {
        self.starts_at = starts_at;
        self.ends_at = ends_at;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Partial update of a relationship. `None` leaves a field untouched;
/// `Some(None)` on a bound clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipUpdate<T> {
    pub relation_kind: Option<String>,
    pub weight: Option<f64>,
    pub starts_at: Option<Option<T>>,
    pub ends_at: Option<Option<T>>,
    pub metadata: Option<serde_json::Value>,
}

impl<T> Default for RelationshipUpdate<T> {
    fn default() -> Self {
        Self {
            relation_kind: None,
            weight: None,
            starts_at: None,
            ends_at: None,
            metadata: None,
        }
    }
}

impl<T> RelationshipUpdate<T> {
    pub fn is_empty(&self) -> bool {
        self.relation_kind.is_none()
            && self.weight.is_none()
            && self.starts_at.is_none()
            && self.ends_at.is_none()
            && self.metadata.is_none()
    }
}

/// Relationships reachable from a center entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipGraph<T> {
    pub center_id: String,
    /// Story instant the graph was restricted to, if any.
    pub at: Option<T>,
    pub relationships: Vec<IntervalRecord<T>>,
    /// Every entity id reached, center included, in discovery order.
    pub entity_ids: Vec<String>,
}

/// One step of a relationship batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum RelationshipOp<T> {
    Create(NewRelationship<T>),
    Update {
        id: String,
        changes: RelationshipUpdate<T>,
    },
    Delete {
        id: String,
    },
}

/// Successful outcome of one batch step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum RelationshipOpOutcome<T> {
    Created(IntervalRecord<T>),
    Updated(IntervalRecord<T>),
    Deleted { id: String },
}
