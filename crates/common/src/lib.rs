//! Shared identifier types used across the command pipeline.

pub mod types;

pub use types::AggregateId;
