use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an aggregate instance.
///
/// Wraps a UUID to provide type safety and prevent mixing up
/// aggregate IDs with other UUID-based identifiers.
///
/// Two construction strategies are supported:
/// - [`AggregateId::new`] generates a random, collision-resistant identifier
///   for brand-new aggregates (e.g. a user signing up).
/// - [`AggregateId::from_business_key`] derives the identifier
///   deterministically from a stable business key, so re-issuing the same
///   "define" command always addresses the same stream, across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(Uuid);

impl AggregateId {
    /// Creates a new random aggregate ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derives an aggregate ID from a stable business key.
    ///
    /// The same `(aggregate_type, key)` pair always yields the same ID.
    /// The aggregate type participates in the derivation so that identical
    /// keys in different aggregate families cannot collide.
    pub fn from_business_key(aggregate_type: &str, key: &str) -> Self {
        let name = format!("{aggregate_type}:{key}");
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }

    /// Creates an aggregate ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AggregateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for AggregateId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AggregateId> for Uuid {
    fn from(id: AggregateId) -> Self {
        id.0
    }
}
