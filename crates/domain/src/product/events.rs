use std::str::FromStr;

use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// How often a card's balance falls due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentCycle {
    Monthly,
    Quarterly,
    Yearly,
}

impl FromStr for PaymentCycle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(PaymentCycle::Monthly),
            "quarterly" => Ok(PaymentCycle::Quarterly),
            "yearly" => Ok(PaymentCycle::Yearly),
            _ => Err(()),
        }
    }
}

/// Reward program attached to a card product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reward {
    None,
    Points,
    Cashback,
}

impl FromStr for Reward {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Reward::None),
            "points" => Ok(Reward::Points),
            "cashback" => Ok(Reward::Cashback),
            _ => Err(()),
        }
    }
}

/// Events of the product aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    /// A product definition was recorded. A later occurrence on the same
    /// stream is a redefinition and replaces the earlier fields wholesale.
    ProductDefined(ProductDefinedData),
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductDefined(_) => "ProductDefined",
        }
    }
}

/// Data for the ProductDefined event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDefinedData {
    /// The product's aggregate ID, derived from the product code.
    pub product_id: AggregateId,

    /// The stable business key the ID was derived from.
    pub product_code: String,

    /// Display name.
    pub name: String,

    /// Annual interest in basis points.
    pub interest_in_basis_points: i64,

    /// Annual fee in cents.
    pub annual_fee_in_cents: i64,

    /// Payment cycle.
    pub payment_cycle: PaymentCycle,

    /// Credit limit in cents.
    pub credit_limit_in_cents: i64,

    /// Maximum balance transfer allowed in cents.
    pub max_balance_transfer_allowed_in_cents: i64,

    /// Reward program.
    pub reward: Reward,

    /// Card art background hex color.
    pub card_background_hex: String,
}
