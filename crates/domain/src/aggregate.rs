//! Core aggregate and domain event traits.

use common::AggregateId;
use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have already happened. They are
/// immutable and named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// Used for envelope tagging and event store filtering.
    fn event_type(&self) -> &'static str;
}

/// Trait for event-sourced aggregates.
///
/// An aggregate is a consistency boundary: all of its events are totally
/// ordered in one stream and read together to reconstruct its state.
///
/// Aggregates:
/// - are rebuilt by left-folding their stream through [`Aggregate::apply`]
/// - hold no state the stream cannot reproduce
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate type name.
    ///
    /// Used for event stream organization and deterministic identity
    /// derivation.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's unique identifier.
    ///
    /// Returns None for an aggregate whose stream has no events yet.
    fn id(&self) -> Option<AggregateId>;

    /// Returns the current version of the aggregate.
    fn version(&self) -> Version;

    /// Sets the aggregate version.
    ///
    /// Called by the command pipeline while folding the stream.
    fn set_version(&mut self, version: Version);

    /// Applies an event to the aggregate, updating its state.
    ///
    /// Must be pure and deterministic: the same state and event always
    /// produce the same new state, with no side effects and no failure.
    /// Events are facts that have already happened.
    fn apply(&mut self, event: Self::Event);

    /// Applies multiple events in sequence.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum CounterEvent {
        Started { id: AggregateId },
        Incremented { by: i32 },
    }

    impl DomainEvent for CounterEvent {
        fn event_type(&self) -> &'static str {
            match self {
                CounterEvent::Started { .. } => "Started",
                CounterEvent::Incremented { .. } => "Incremented",
            }
        }
    }

    #[derive(Debug, Default)]
    struct Counter {
        id: Option<AggregateId>,
        total: i32,
        version: Version,
    }

    impl Aggregate for Counter {
        type Event = CounterEvent;

        fn aggregate_type() -> &'static str {
            "Counter"
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
                CounterEvent::Started { id } => self.id = Some(id),
                CounterEvent::Incremented { by } => self.total += by,
            }
        }
    }

    #[test]
    fn apply_events_folds_in_order() {
        let id = AggregateId::new();
        let mut counter = Counter::default();
        counter.apply_events(vec![
            CounterEvent::Started { id },
            CounterEvent::Incremented { by: 2 },
            CounterEvent::Incremented { by: 3 },
        ]);

        assert_eq!(counter.id(), Some(id));
        assert_eq!(counter.total, 5);
    }

    #[test]
    fn replay_is_deterministic() {
        let id = AggregateId::new();
        let events = vec![
            CounterEvent::Started { id },
            CounterEvent::Incremented { by: 7 },
        ];

        let mut first = Counter::default();
        first.apply_events(events.clone());
        let mut second = Counter::default();
        second.apply_events(events);

        assert_eq!(first.total, second.total);
        assert_eq!(first.id(), second.id());
    }
}
