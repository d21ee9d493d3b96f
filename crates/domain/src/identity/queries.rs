use async_trait::async_trait;

/// Capability answering "is this email already registered?".
///
/// Injected into the sign-up handler so orchestration stays decoupled from
/// how the lookup is performed (index, cache, remote service). Test doubles
/// implement the same contract with canned logic.
#[async_trait]
pub trait IsEmailTaken: Send + Sync {
    async fn is_email_taken(&self, email: &str) -> bool;
}

/// Capability answering "is this username already registered?".
#[async_trait]
pub trait IsUsernameTaken: Send + Sync {
    async fn is_username_taken(&self, username: &str) -> bool;
}
