use common::AggregateId;
use event_store::Version;

use crate::aggregate::Aggregate;

use super::events::UserEvent;

/// The user aggregate, reconstructed by folding its event stream.
#[derive(Debug, Default)]
pub struct User {
    id: Option<AggregateId>,
    primary_email: Option<String>,
    hashed_password: Option<String>,
    username: Option<String>,
    terms_of_use_accepted: bool,
    version: Version,
}

impl User {
    /// The email the user signed up with.
    pub fn primary_email(&self) -> Option<&str> {
        self.primary_email.as_deref()
    }

    /// The stored one-way password hash.
    pub fn hashed_password(&self) -> Option<&str> {
        self.hashed_password.as_deref()
    }

    /// The user's username.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Whether the terms of use were accepted at sign-up.
    pub fn terms_of_use_accepted(&self) -> bool {
        self.terms_of_use_accepted
    }
}

impl Aggregate for User {
    type Event = UserEvent;

    fn aggregate_type() -> &'static str {
        "User"
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
            UserEvent::SignedUp(data) => {
                self.id = Some(data.user_id);
                self.primary_email = Some(data.primary_email);
                self.hashed_password = Some(data.hashed_password);
                self.username = Some(data.username);
                self.terms_of_use_accepted = data.terms_of_use_accepted;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::events::SignedUpData;

    #[test]
    fn signed_up_initializes_state() {
        let user_id = AggregateId::new();
        let mut user = User::default();
        assert!(user.id().is_none());

        user.apply(UserEvent::SignedUp(SignedUpData {
            user_id,
            primary_email: "person@example.com".to_string(),
            hashed_password: "ab$cd".to_string(),
            username: "person".to_string(),
            terms_of_use_accepted: true,
        }));

        assert_eq!(user.id(), Some(user_id));
        assert_eq!(user.primary_email(), Some("person@example.com"));
        assert_eq!(user.username(), Some("person"));
        assert!(user.terms_of_use_accepted());
    }
}
