//! Append-only, per-aggregate-stream event log with optimistic concurrency.
//!
//! The store is the single source of truth: it holds no materialized
//! aggregate state, only ordered event sequences. Two implementations are
//! provided: [`InMemoryEventStore`] for tests and wiring without external
//! infrastructure, and [`PostgresEventStore`] for durable storage.

pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, EventMetadata, Version};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use store::{AppendOptions, EventStore};
