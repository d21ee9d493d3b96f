use async_trait::async_trait;

use crate::{AggregateId, EventEnvelope, EventStoreError, Result, Version};

/// Options for appending events to the store.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Expected current version of the stream, for optimistic concurrency
    /// control. If None, no version check is performed (use with caution).
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the stream to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the stream to not exist yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Core trait for event store implementations.
///
/// The store is append-only: acknowledged events are never mutated or
/// deleted. All implementations must be thread-safe (Send + Sync) and must
/// serialize concurrent appends against the same stream so that exactly one
/// of two racing writers succeeds.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends a batch of events to one aggregate stream.
    ///
    /// The batch is applied atomically, all events or none. If
    /// `options.expected_version` is set and does not match the stream's
    /// current version, the append fails with
    /// [`EventStoreError::ConcurrencyConflict`] and the stream is unchanged.
    ///
    /// Returns the new version of the stream after appending.
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version>;

    /// Reads the ordered sequence of all events for one aggregate, from
    /// version 1 to the latest.
    ///
    /// Returns an empty vec (not an error) if the aggregate has never been
    /// written.
    async fn read_stream(&self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>>;

    /// Returns the current version of an aggregate stream, or None if the
    /// stream has no events.
    async fn current_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>>;

    /// Returns every event across all streams, in append order.
    ///
    /// Introspection contract used by test harnesses to assert what a
    /// handler actually persisted; not intended for production traffic.
    async fn all_events(&self) -> Result<Vec<EventEnvelope>>;
}

/// Validates an append batch before it touches storage.
///
/// The batch must be non-empty, target a single aggregate, and carry
/// strictly contiguous versions.
pub fn validate_append_batch(events: &[EventEnvelope]) -> Result<()> {
    let first = events
        .first()
        .ok_or_else(|| EventStoreError::InvalidBatch("empty event batch".to_string()))?;

    for event in events.iter().skip(1) {
        if event.aggregate_id != first.aggregate_id {
            return Err(EventStoreError::InvalidBatch(
                "all events in a batch must target the same aggregate".to_string(),
            ));
        }
        if event.aggregate_type != first.aggregate_type {
            return Err(EventStoreError::InvalidBatch(
                "all events in a batch must share one aggregate type".to_string(),
            ));
        }
    }

    let mut expected = first.version;
    for event in events.iter().skip(1) {
        expected = expected.next();
        if event.version != expected {
            return Err(EventStoreError::InvalidBatch(format!(
                "event versions must be contiguous: expected {expected}, got {}",
                event.version
            )));
        }
    }

    Ok(())
}
