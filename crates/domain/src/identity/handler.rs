use std::sync::Arc;

use common::AggregateId;
use event_queue::EventQueue;
use event_store::EventStore;
use serde::Serialize;

use crate::password;
use crate::pipeline::{CommandPipeline, PipelineError};
use crate::validation;

use super::aggregate::User;
use super::commands::SignUp;
use super::events::{SignedUpData, UserEvent};
use super::queries::{IsEmailTaken, IsUsernameTaken};

/// Everything that can stop a sign-up.
///
/// Format checks come first and are caller-caused; uniqueness checks run
/// only after every format check passed; the pipeline variant carries
/// infrastructure failures (concurrency conflict, storage unavailable,
/// stored-but-unpublished).
#[derive(Debug, thiserror::Error)]
pub enum SignUpError {
    #[error("invalid email")]
    InvalidEmail,

    #[error("invalid password")]
    InvalidPassword,

    #[error("invalid username")]
    InvalidUsername,

    #[error("terms of use are not agreed to")]
    TermsAreNotAgreedTo,

    #[error("email is taken")]
    EmailIsTaken,

    #[error("username is taken")]
    UsernameIsTaken,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Response returned to the transport layer after a successful sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    /// The freshly generated user aggregate ID.
    pub user_id: AggregateId,
}

/// Handler for the [`SignUp`] command.
///
/// All capabilities are passed in at construction time; nothing is looked
/// up from ambient state.
pub struct SignUpHandler<S, Q>
where
    S: EventStore,
    Q: EventQueue,
{
    pipeline: CommandPipeline<S, Q, User>,
    is_email_taken: Arc<dyn IsEmailTaken>,
    is_username_taken: Arc<dyn IsUsernameTaken>,
}

impl<S, Q> SignUpHandler<S, Q>
where
    S: EventStore,
    Q: EventQueue,
{
    /// Creates a new sign-up handler.
    pub fn new(
        store: S,
        queue: Q,
        is_email_taken: Arc<dyn IsEmailTaken>,
        is_username_taken: Arc<dyn IsUsernameTaken>,
    ) -> Self {
        Self {
            pipeline: CommandPipeline::new(store, queue),
            is_email_taken,
            is_username_taken,
        }
    }

    /// Handles a sign-up command.
    ///
    /// Validation is fail-fast in declared field order: email, password,
    /// username, terms flag, then the uniqueness lookups. On the first
    /// failure nothing is stored or published. On success exactly one
    /// `SignedUp` event is appended and the same event is queued.
    #[tracing::instrument(skip(self, command), fields(username = %command.username))]
    pub async fn handle(&self, command: SignUp) -> Result<SignUpResponse, SignUpError> {
        if !validation::email_is_valid(&command.primary_email) {
            return Err(SignUpError::InvalidEmail);
        }
        if !validation::password_is_valid(&command.password) {
            return Err(SignUpError::InvalidPassword);
        }
        if !validation::username_is_valid(&command.username) {
            return Err(SignUpError::InvalidUsername);
        }
        if !command.terms_of_use_accepted {
            return Err(SignUpError::TermsAreNotAgreedTo);
        }

        if self
            .is_email_taken
            .is_email_taken(&command.primary_email)
            .await
        {
            return Err(SignUpError::EmailIsTaken);
        }
        if self
            .is_username_taken
            .is_username_taken(&command.username)
            .await
        {
            return Err(SignUpError::UsernameIsTaken);
        }

        let user_id = AggregateId::new();
        let event = UserEvent::SignedUp(SignedUpData {
            user_id,
            primary_email: command.primary_email.clone(),
            hashed_password: password::hash_password(&command.password),
            username: command.username.clone(),
            terms_of_use_accepted: command.terms_of_use_accepted,
        });

        self.pipeline
            .execute(user_id, command.metadata.clone(), |_user| {
                Ok::<_, SignUpError>(vec![event])
            })
            .await?;

        metrics::counter!("commands_handled", "command" => "sign_up").increment(1);
        tracing::info!(%user_id, "user signed up");

        Ok(SignUpResponse { user_id })
    }
}
