use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventStoreError, Result, Version,
    store::{AppendOptions, EventStore, validate_append_batch},
};

/// In-memory event store.
///
/// Events live in a single append-order vec behind an async RwLock; the
/// write lock serializes concurrent appends so the optimistic version check
/// is race-free. Used by tests and by wiring that needs no external
/// infrastructure.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Synonym for [`EventStore::all_events`] matching the introspection
    /// contract used in handler tests.
    pub async fn stored_events(&self) -> Vec<EventEnvelope> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        validate_append_batch(&events)?;

        let aggregate_id = events[0].aggregate_id;

        // Hold the write lock across check-and-extend: appends against the
        // same stream are serialized here.
        let mut store = self.events.write().await;

        let current_version = store
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .map(|e| e.version)
            .max()
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current_version,
            });
        }

        if events[0].version != current_version.next() {
            return Err(EventStoreError::InvalidBatch(format!(
                "first event version {} does not continue stream at {}",
                events[0].version, current_version
            )));
        }

        let last_version = events
            .last()
            .map(|e| e.version)
            .unwrap_or(current_version);
        store.extend(events);

        Ok(last_version)
    }

    async fn read_stream(&self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>> {
        let store = self.events.read().await;
        let mut events: Vec<_> = store
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.version);
        Ok(events)
    }

    async fn current_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let store = self.events.read().await;
        let version = store
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .map(|e| e.version)
            .max();
        Ok(version)
    }

    async fn all_events(&self) -> Result<Vec<EventEnvelope>> {
        Ok(self.events.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventMetadata;

    fn create_test_event(
        aggregate_id: AggregateId,
        version: Version,
        event_type: &str,
    ) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type("User")
            .event_type(event_type)
            .version(version)
            .payload_raw(serde_json::json!({"test": true}))
            .metadata(EventMetadata::new(None))
            .build()
    }

    #[tokio::test]
    async fn append_single_event() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::new();
        let event = create_test_event(aggregate_id, Version::first(), "SignedUp");

        let result = store.append(vec![event], AppendOptions::expect_new()).await;
        assert_eq!(result.unwrap(), Version::first());

        let events = store.read_stream(aggregate_id).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn append_batch_is_atomic_and_ordered() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::new();

        let events = vec![
            create_test_event(aggregate_id, Version::new(1), "Event1"),
            create_test_event(aggregate_id, Version::new(2), "Event2"),
            create_test_event(aggregate_id, Version::new(3), "Event3"),
        ];

        let result = store.append(events, AppendOptions::expect_new()).await;
        assert_eq!(result.unwrap(), Version::new(3));

        let stored = store.read_stream(aggregate_id).await.unwrap();
        let versions: Vec<i64> = stored.iter().map(|e| e.version.as_i64()).collect();
        assert_eq!(versions, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn read_stream_of_unknown_aggregate_is_empty() {
        let store = InMemoryEventStore::new();
        let events = store.read_stream(AggregateId::new()).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn conflict_on_stale_expected_version() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::new();

        let event1 = create_test_event(aggregate_id, Version::first(), "Event1");
        store
            .append(vec![event1], AppendOptions::expect_new())
            .await
            .unwrap();

        // A second writer that read the stream before the first append.
        let event2 = create_test_event(aggregate_id, Version::first(), "Event2");
        let result = store
            .append(vec![event2], AppendOptions::expect_new())
            .await;

        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));

        // Stream unchanged by the failed append.
        let events = store.read_stream(aggregate_id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "Event1");
    }

    #[tokio::test]
    async fn append_with_correct_expected_version_succeeds() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::new();

        let event1 = create_test_event(aggregate_id, Version::first(), "Event1");
        store
            .append(vec![event1], AppendOptions::expect_new())
            .await
            .unwrap();

        let event2 = create_test_event(aggregate_id, Version::new(2), "Event2");
        let result = store
            .append(
                vec![event2],
                AppendOptions::expect_version(Version::first()),
            )
            .await;

        assert_eq!(result.unwrap(), Version::new(2));
    }

    #[tokio::test]
    async fn versions_stay_contiguous_across_appends() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::new();

        for n in 1..=5 {
            let event = create_test_event(aggregate_id, Version::new(n), "Event");
            store
                .append(
                    vec![event],
                    AppendOptions::expect_version(Version::new(n - 1)),
                )
                .await
                .unwrap();
        }

        let events = store.read_stream(aggregate_id).await.unwrap();
        let versions: Vec<i64> = events.iter().map(|e| e.version.as_i64()).collect();
        assert_eq!(versions, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            store.current_version(aggregate_id).await.unwrap(),
            Some(Version::new(5))
        );
    }

    #[tokio::test]
    async fn gap_in_first_version_is_rejected() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::new();

        let event = create_test_event(aggregate_id, Version::new(2), "Event");
        let result = store.append(vec![event], AppendOptions::new()).await;
        assert!(matches!(result, Err(EventStoreError::InvalidBatch(_))));
    }

    #[tokio::test]
    async fn all_events_preserves_append_order_across_streams() {
        let store = InMemoryEventStore::new();
        let id1 = AggregateId::new();
        let id2 = AggregateId::new();

        store
            .append(
                vec![create_test_event(id1, Version::first(), "First")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();
        store
            .append(
                vec![create_test_event(id2, Version::first(), "Second")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();
        store
            .append(
                vec![create_test_event(id1, Version::new(2), "Third")],
                AppendOptions::expect_version(Version::first()),
            )
            .await
            .unwrap();

        let all = store.all_events().await.unwrap();
        let types: Vec<&str> = all.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn racing_appends_let_exactly_one_writer_win() {
        let store = InMemoryEventStore::new();
        let aggregate_id = AggregateId::new();

        let a = store.clone();
        let b = store.clone();
        let event_a = create_test_event(aggregate_id, Version::first(), "WriterA");
        let event_b = create_test_event(aggregate_id, Version::first(), "WriterB");

        let (ra, rb) = tokio::join!(
            a.append(vec![event_a], AppendOptions::expect_new()),
            b.append(vec![event_b], AppendOptions::expect_new()),
        );

        assert_ne!(ra.is_ok(), rb.is_ok());
        assert_eq!(store.event_count().await, 1);
    }
}
