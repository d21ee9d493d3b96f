use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events of the user aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserEvent {
    /// A new user registered.
    SignedUp(SignedUpData),
}

impl DomainEvent for UserEvent {
    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::SignedUp(_) => "SignedUp",
        }
    }
}

/// Data for the SignedUp event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedUpData {
    /// The new user's aggregate ID.
    pub user_id: AggregateId,

    /// The email the user signed up with.
    pub primary_email: String,

    /// One-way hash of the password; the cleartext is never stored.
    pub hashed_password: String,

    /// The username the user signed up with.
    pub username: String,

    /// Whether the user accepted the terms of use.
    pub terms_of_use_accepted: bool,
}
