//! Domain layer for the command-handling pipeline.
//!
//! This crate provides:
//! - Aggregate and DomainEvent traits for event-sourced entities
//! - A generic command pipeline enforcing validate → append → publish
//! - Primitive (format) validation rules and the one-way password hash
//! - The `identity` module: user sign-up with uniqueness lookups
//! - The `product` module: deterministic-identity credit-card products

pub mod aggregate;
pub mod identity;
pub mod password;
pub mod pipeline;
pub mod product;
pub mod validation;

pub use aggregate::{Aggregate, DomainEvent};
pub use identity::{
    IsEmailTaken, IsUsernameTaken, SignUp, SignUpError, SignUpHandler, SignUpResponse,
    SignedUpData, User, UserEvent,
};
pub use pipeline::{CommandOutcome, CommandPipeline, PipelineError};
pub use product::{
    DefineProduct, DefineProductError, DefineProductHandler, DefineProductResponse, PaymentCycle,
    Product, ProductDefinedData, ProductEvent, Reward,
};
