//! Credit-card product bounded module: deterministic-identity definitions.

mod aggregate;
mod commands;
mod events;
mod handler;

pub use aggregate::Product;
pub use commands::DefineProduct;
pub use events::{PaymentCycle, ProductDefinedData, ProductEvent, Reward};
pub use handler::{DefineProductError, DefineProductHandler, DefineProductResponse};
