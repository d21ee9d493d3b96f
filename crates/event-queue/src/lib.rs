//! Delivery channel for stored events.
//!
//! The queue is a secondary, replayable view of facts already appended to
//! the event store, never a separate source of truth. Delivery is
//! at-least-once; consumers de-duplicate on `(aggregate_id, version)`.

use std::sync::Arc;

use async_trait::async_trait;
use event_store::EventEnvelope;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur when publishing events.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The delivery channel could not accept the event.
    #[error("queue unavailable: {0}")]
    Unavailable(String),
}

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Capability for publishing stored events to downstream consumers.
///
/// Publish is attempted exactly once per successfully stored event; the
/// channel itself may redeliver, so consumers must tolerate duplicates.
#[async_trait]
pub trait EventQueue: Send + Sync {
    /// Enqueues one event for delivery to subscribers.
    async fn publish(&self, event: &EventEnvelope) -> Result<()>;
}

/// In-memory event queue.
///
/// A shared append-only buffer used by tests and single-process wiring.
#[derive(Clone, Default)]
pub struct InMemoryEventQueue {
    events: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl InMemoryEventQueue {
    /// Creates a new empty in-memory queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything published so far, in publish order.
    ///
    /// Introspection contract used by test harnesses to assert what a
    /// handler actually published.
    pub async fn queued_events(&self) -> Vec<EventEnvelope> {
        self.events.read().await.clone()
    }

    /// Returns the number of events published so far.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl EventQueue for InMemoryEventQueue {
    async fn publish(&self, event: &EventEnvelope) -> Result<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }
}
