//! Generic command pipeline: load, decide, append, publish.

use std::marker::PhantomData;

use common::AggregateId;
use event_queue::{EventQueue, QueueError};
use event_store::{
    AppendOptions, EventEnvelope, EventMetadata, EventStore, EventStoreError, Version,
};

use crate::aggregate::{Aggregate, DomainEvent};

/// Infrastructure failures surfaced by the pipeline.
///
/// Validation errors never reach this type; handlers return them before the
/// pipeline runs.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The event store rejected or could not complete an operation.
    /// Includes concurrency conflicts and storage unavailability.
    #[error(transparent)]
    Store(#[from] EventStoreError),

    /// An event was durably appended but could not be published.
    ///
    /// The highest-severity failure class: downstream consumers' view of
    /// the system is stale until the queue is reconciled. Never swallowed.
    #[error(
        "event stored but not published for aggregate {aggregate_id} at version {version}: {source}"
    )]
    PublishFailedAfterStore {
        aggregate_id: AggregateId,
        version: Version,
        source: QueueError,
    },

    /// An event payload could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// True when the failure is a lost optimistic-concurrency race that the
    /// caller may resolve by re-reading and retrying.
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(
            self,
            PipelineError::Store(EventStoreError::ConcurrencyConflict { .. })
        )
    }
}

/// Result of a successful pipeline execution.
#[derive(Debug)]
pub struct CommandOutcome<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were persisted and published.
    pub events: Vec<A::Event>,

    /// The new version of the aggregate stream.
    pub new_version: Version,
}

/// Orchestrates one logical unit of work against a single aggregate stream.
///
/// The pipeline:
/// 1. Reconstructs the aggregate by folding its stream
/// 2. Runs the command closure against the current state
/// 3. Appends the resulting events at the expected version (atomic batch)
/// 4. Publishes each appended event to the queue
///
/// An event is published if and only if it was durably appended. A publish
/// failure after a successful append surfaces as
/// [`PipelineError::PublishFailedAfterStore`]; nothing is retried here.
/// Retry policy belongs to the caller or the infrastructure.
pub struct CommandPipeline<S, Q, A>
where
    S: EventStore,
    Q: EventQueue,
    A: Aggregate,
{
    store: S,
    queue: Q,
    _phantom: PhantomData<A>,
}

impl<S, Q, A> CommandPipeline<S, Q, A>
where
    S: EventStore,
    Q: EventQueue,
    A: Aggregate,
{
    /// Creates a new pipeline over the given store and queue.
    pub fn new(store: S, queue: Q) -> Self {
        Self {
            store,
            queue,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconstructs an aggregate by replaying its stream.
    ///
    /// Returns a default (never-written) instance if the stream is empty.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, PipelineError> {
        let envelopes = self.store.read_stream(aggregate_id).await?;

        let mut aggregate = A::default();
        for envelope in envelopes {
            let event: A::Event = serde_json::from_value(envelope.payload)?;
            aggregate.apply(event);
            aggregate.set_version(envelope.version);
        }

        Ok(aggregate)
    }

    /// Executes a command closure and persists then publishes the events it
    /// produces.
    ///
    /// The closure sees the aggregate's current state and returns either
    /// events to append or a handler-level error, which propagates
    /// unchanged. On any failure before the append, no observable state
    /// changes.
    pub async fn execute<F, E>(
        &self,
        aggregate_id: AggregateId,
        metadata: EventMetadata,
        command_fn: F,
    ) -> Result<CommandOutcome<A>, E>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, E>,
        E: From<PipelineError>,
    {
        let mut aggregate = self.load(aggregate_id).await.map_err(E::from)?;
        let current_version = aggregate.version();

        let events = command_fn(&aggregate)?;

        if events.is_empty() {
            return Ok(CommandOutcome {
                aggregate,
                events: vec![],
                new_version: current_version,
            });
        }

        let envelopes = self
            .build_envelopes(aggregate_id, current_version, metadata, &events)
            .map_err(|e| E::from(PipelineError::Serialization(e)))?;

        let new_version = self
            .store
            .append(envelopes.clone(), AppendOptions::expect_version(current_version))
            .await
            .map_err(|e| E::from(PipelineError::Store(e)))?;

        metrics::counter!("events_appended").increment(envelopes.len() as u64);

        // Store-then-publish: each event goes to the queue only after the
        // whole batch is durable.
        for envelope in &envelopes {
            if let Err(source) = self.queue.publish(envelope).await {
                tracing::error!(
                    aggregate_id = %envelope.aggregate_id,
                    version = %envelope.version,
                    error = %source,
                    "event stored but not published"
                );
                metrics::counter!("publish_failures_after_store").increment(1);
                return Err(E::from(PipelineError::PublishFailedAfterStore {
                    aggregate_id: envelope.aggregate_id,
                    version: envelope.version,
                    source,
                }));
            }
        }

        for event in &events {
            aggregate.apply(event.clone());
        }
        aggregate.set_version(new_version);

        Ok(CommandOutcome {
            aggregate,
            events,
            new_version,
        })
    }

    /// Wraps domain events in envelopes at contiguous versions after
    /// `current_version`, stamping each with the command's metadata.
    fn build_envelopes(
        &self,
        aggregate_id: AggregateId,
        current_version: Version,
        metadata: EventMetadata,
        events: &[A::Event],
    ) -> Result<Vec<EventEnvelope>, serde_json::Error> {
        let mut envelopes = Vec::with_capacity(events.len());
        let mut version = current_version;

        for event in events {
            version = version.next();
            let envelope = EventEnvelope::builder()
                .aggregate_id(aggregate_id)
                .aggregate_type(A::aggregate_type())
                .event_type(event.event_type())
                .version(version)
                .payload(event)?
                .metadata(metadata.clone())
                .build();
            envelopes.push(envelope);
        }

        Ok(envelopes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use event_queue::InMemoryEventQueue;
    use event_store::InMemoryEventStore;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum NoteEvent {
        Written { id: AggregateId, text: String },
    }

    impl DomainEvent for NoteEvent {
        fn event_type(&self) -> &'static str {
            "NoteWritten"
        }
    }

    #[derive(Debug, Default)]
    struct Note {
        id: Option<AggregateId>,
        text: String,
        version: Version,
    }

    impl Aggregate for Note {
        type Event = NoteEvent;

        fn aggregate_type() -> &'static str {
            "Note"
        }

        fn id(&self) -> Option<AggregateId> {
            self.id
        }

        fn version(&self) -> Version {
            self.version
        }

        fn set_version(&mut self, version: Version) {
            self.version = version;
        }

        fn apply(&mut self, event: Self::Event) {
            match event {
                NoteEvent::Written { id, text } => {
                    self.id = Some(id);
                    self.text = text;
                }
            }
        }
    }

    /// A queue that refuses every publish, for the stored-but-unpublished
    /// failure path.
    struct BrokenQueue;

    #[async_trait]
    impl EventQueue for BrokenQueue {
        async fn publish(&self, _event: &EventEnvelope) -> event_queue::Result<()> {
            Err(QueueError::Unavailable("broker down".to_string()))
        }
    }

    fn written(id: AggregateId, text: &str) -> NoteEvent {
        NoteEvent::Written {
            id,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn execute_appends_and_publishes() {
        let store = InMemoryEventStore::new();
        let queue = InMemoryEventQueue::new();
        let pipeline: CommandPipeline<_, _, Note> =
            CommandPipeline::new(store.clone(), queue.clone());
        let id = AggregateId::new();

        let outcome = pipeline
            .execute(id, EventMetadata::new(None), |_note| {
                Ok::<_, PipelineError>(vec![written(id, "hello")])
            })
            .await
            .unwrap();

        assert_eq!(outcome.new_version, Version::first());
        assert_eq!(outcome.aggregate.text, "hello");

        let stored = store.stored_events().await;
        let queued = queue.queued_events().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored, queued);
    }

    #[tokio::test]
    async fn execute_continues_existing_stream() {
        let store = InMemoryEventStore::new();
        let queue = InMemoryEventQueue::new();
        let pipeline: CommandPipeline<_, _, Note> =
            CommandPipeline::new(store.clone(), queue.clone());
        let id = AggregateId::new();

        pipeline
            .execute(id, EventMetadata::new(None), |_| {
                Ok::<_, PipelineError>(vec![written(id, "one")])
            })
            .await
            .unwrap();
        let outcome = pipeline
            .execute(id, EventMetadata::new(None), |_| {
                Ok::<_, PipelineError>(vec![written(id, "two")])
            })
            .await
            .unwrap();

        assert_eq!(outcome.new_version, Version::new(2));
        assert_eq!(outcome.aggregate.text, "two");
    }

    #[tokio::test]
    async fn command_error_leaves_store_and_queue_empty() {
        let store = InMemoryEventStore::new();
        let queue = InMemoryEventQueue::new();
        let pipeline: CommandPipeline<_, _, Note> =
            CommandPipeline::new(store.clone(), queue.clone());

        #[derive(Debug, thiserror::Error)]
        enum NoteError {
            #[error("rejected")]
            Rejected,
            #[error(transparent)]
            Pipeline(#[from] PipelineError),
        }

        let result = pipeline
            .execute(AggregateId::new(), EventMetadata::new(None), |_| {
                Err::<Vec<NoteEvent>, _>(NoteError::Rejected)
            })
            .await;

        assert!(matches!(result, Err(NoteError::Rejected)));
        assert_eq!(store.event_count().await, 0);
        assert_eq!(queue.event_count().await, 0);
    }

    #[tokio::test]
    async fn empty_event_list_is_a_no_op() {
        let store = InMemoryEventStore::new();
        let queue = InMemoryEventQueue::new();
        let pipeline: CommandPipeline<_, _, Note> =
            CommandPipeline::new(store.clone(), queue.clone());

        let outcome = pipeline
            .execute(AggregateId::new(), EventMetadata::new(None), |_| {
                Ok::<_, PipelineError>(vec![])
            })
            .await
            .unwrap();

        assert!(outcome.events.is_empty());
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn publish_failure_after_append_is_loud_and_distinct() {
        let store = InMemoryEventStore::new();
        let pipeline: CommandPipeline<_, _, Note> =
            CommandPipeline::new(store.clone(), BrokenQueue);
        let id = AggregateId::new();

        let result = pipeline
            .execute(id, EventMetadata::new(None), |_| {
                Ok::<_, PipelineError>(vec![written(id, "orphan")])
            })
            .await;

        assert!(matches!(
            result,
            Err(PipelineError::PublishFailedAfterStore { .. })
        ));
        // The event is durable even though delivery failed.
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn load_replays_to_the_same_state() {
        let store = InMemoryEventStore::new();
        let queue = InMemoryEventQueue::new();
        let pipeline: CommandPipeline<_, _, Note> =
            CommandPipeline::new(store.clone(), queue.clone());
        let id = AggregateId::new();

        pipeline
            .execute(id, EventMetadata::new(None), |_| {
                Ok::<_, PipelineError>(vec![written(id, "final text")])
            })
            .await
            .unwrap();

        let first = pipeline.load(id).await.unwrap();
        let second = pipeline.load(id).await.unwrap();
        assert_eq!(first.text, "final text");
        assert_eq!(first.text, second.text);
        assert_eq!(first.version(), second.version());
    }
}
