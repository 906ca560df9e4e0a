//! # saga-core
//!
//! Foundation types for the saga temporal engine.
//! Errors, configuration, record models, time keys and the store traits
//! the API layer programs against.

pub mod config;
pub mod errors;
pub mod models;
pub mod observability;
pub mod traits;

pub use errors::{SagaError, SagaResult};
