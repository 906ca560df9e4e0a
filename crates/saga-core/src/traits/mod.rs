mod relationship_store;
mod versioned_store;

pub use relationship_store::IRelationshipStore;
pub use versioned_store::IVersionedStore;
