//! Business-time relationship intervals.

mod graph;
mod store;

pub use store::TemporalRelationshipStore;
