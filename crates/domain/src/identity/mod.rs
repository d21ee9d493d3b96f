//! Identity bounded module: user sign-up.

mod aggregate;
mod commands;
mod events;
mod handler;
mod queries;

pub use aggregate::User;
pub use commands::SignUp;
pub use events::{SignedUpData, UserEvent};
pub use handler::{SignUpError, SignUpHandler, SignUpResponse};
pub use queries::{IsEmailTaken, IsUsernameTaken};
