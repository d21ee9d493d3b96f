use thiserror::Error;

use crate::{AggregateId, Version};

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The stream advanced past the expected version between read and
    /// append. Callers may retry by re-reading and recomputing.
    #[error(
        "concurrency conflict for aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// The batch handed to `append` was malformed (empty, mixed aggregates,
    /// or non-contiguous versions). Nothing was written.
    #[error("invalid append batch: {0}")]
    InvalidBatch(String),

    /// The underlying storage could not complete the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
