use event_store::EventMetadata;

/// Command to register a new user.
///
/// Commands are immutable once dispatched and carry no identity of their
/// own beyond metadata; the handler generates the user's aggregate ID.
#[derive(Debug, Clone)]
pub struct SignUp {
    /// The email the user signs up with.
    pub primary_email: String,

    /// Cleartext password; leaves this process only as a one-way hash.
    pub password: String,

    /// Requested username.
    pub username: String,

    /// Whether the user explicitly accepted the terms of use.
    pub terms_of_use_accepted: bool,

    /// Caller/session identity and causal tracing identifiers.
    pub metadata: EventMetadata,
}

impl SignUp {
    /// Creates a new SignUp command.
    pub fn new(
        primary_email: impl Into<String>,
        password: impl Into<String>,
        username: impl Into<String>,
        terms_of_use_accepted: bool,
        metadata: EventMetadata,
    ) -> Self {
        Self {
            primary_email: primary_email.into(),
            password: password.into(),
            username: username.into(),
            terms_of_use_accepted,
            metadata,
        }
    }
}
