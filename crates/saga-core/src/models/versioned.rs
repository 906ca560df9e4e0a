//! System-time version records.

use serde::{Deserialize, Serialize};

use super::TimePoint;

/// Per-id version number. The first version of an id is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub u64);

impl VersionId {
    pub const FIRST: VersionId = VersionId(1);

    pub fn next(self) -> VersionId {
        VersionId(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Why a version was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Updated,
    Deleted,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Updated => "updated",
            Operation::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "updated" => Some(Operation::Updated),
            "deleted" => Some(Operation::Deleted),
            _ => None,
        }
    }
}

/// A closed version from the history log.
///
/// The window `[valid_from, valid_to)` is half-open and never re-opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedRecord<P, T> {
    pub id: String,
    pub version: VersionId,
    pub payload: P,
    pub valid_from: T,
    pub valid_to: T,
    pub operation: Operation,
}

impl<P, T: TimePoint> VersionedRecord<P, T> {
    /// True iff `valid_from <= at < valid_to`.
    pub fn covers(&self, at: T) -> bool {
        self.valid_from <= at && at < self.valid_to
    }
}

/// The current version of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveRecord<P, T> {
    pub id: String,
    pub version: VersionId,
    pub payload: P,
    pub created_at: T,
    pub updated_at: T,
}

/// Where an AS OF answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    History,
    Live,
}

/// A record as it was at some system instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsOfRecord<P, T> {
    pub id: String,
    pub version: VersionId,
    pub payload: P,
    pub valid_from: T,
    /// `None` while the version is still live.
    pub valid_to: Option<T>,
    pub source: RecordSource,
}

impl<P, T> AsOfRecord<P, T> {
    pub fn is_historical(&self) -> bool {
        self.source == RecordSource::History
    }
}

impl<P, T> From<VersionedRecord<P, T>> for AsOfRecord<P, T> {
    fn from(r: VersionedRecord<P, T>) -> Self {
        Self {
            id: r.id,
            version: r.version,
            payload: r.payload,
            valid_from: r.valid_from,
            valid_to: Some(r.valid_to),
            source: RecordSource::History,
        }
    }
}

impl<P, T> From<LiveRecord<P, T>> for AsOfRecord<P, T> {
    fn from(r: LiveRecord<P, T>) -> Self {
        Self {
            id: r.id,
            version: r.version,
            payload: r.payload,
            valid_from: r.updated_at,
            valid_to: None,
            source: RecordSource::Live,
        }
    }
}

/// Result of checking that an id's windows partition its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionReport<T> {
    pub id: String,
    pub archived_versions: usize,
    pub has_live: bool,
    /// Uncovered spans `[from, to)` inside one incarnation of the id.
    pub gaps: Vec<(T, T)>,
    /// Pairs of versions whose windows intersect.
    pub overlaps: Vec<(VersionId, VersionId)>,
    /// Versions archived with `valid_from > valid_to`.
    pub inverted: Vec<VersionId>,
    /// The newest archived version was closed as `Updated` but no live row
    /// succeeded it.
    pub missing_successor: bool,
}

impl<T> PartitionReport<T> {
    pub fn is_partition(&self) -> bool {
        self.gaps.is_empty()
            && self.overlaps.is_empty()
            && self.inverted.is_empty()
            && !self.missing_successor
    }
}
