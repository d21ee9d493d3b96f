use common::AggregateId;
use event_queue::EventQueue;
use event_store::EventStore;
use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::pipeline::{CommandPipeline, PipelineError};
use crate::validation;

use super::aggregate::Product;
use super::commands::DefineProduct;
use super::events::{PaymentCycle, ProductDefinedData, ProductEvent, Reward};

/// Everything that can stop a product definition.
#[derive(Debug, thiserror::Error)]
pub enum DefineProductError {
    #[error("invalid product code")]
    InvalidProductCode,

    #[error("invalid product name")]
    InvalidName,

    #[error("invalid interest rate")]
    InvalidInterestRate,

    #[error("invalid annual fee")]
    InvalidAnnualFee,

    #[error("invalid payment cycle")]
    InvalidPaymentCycle,

    #[error("invalid credit limit")]
    InvalidCreditLimit,

    #[error("invalid balance transfer limit")]
    InvalidBalanceTransferLimit,

    #[error("invalid reward")]
    InvalidReward,

    #[error("invalid card background color")]
    InvalidCardBackground,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Response returned to the caller after a successful definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefineProductResponse {
    /// The product's aggregate ID, derived from its product code.
    pub product_id: AggregateId,
}

/// Handler for the [`DefineProduct`] command.
///
/// Identity is deterministic: the aggregate ID is derived from the product
/// code, so the same code always addresses the same stream. Re-issuing the
/// command for an existing code is treated as a legitimate redefinition and
/// appends a `ProductDefined` event at the next stream version.
pub struct DefineProductHandler<S, Q>
where
    S: EventStore,
    Q: EventQueue,
{
    pipeline: CommandPipeline<S, Q, Product>,
}

impl<S, Q> DefineProductHandler<S, Q>
where
    S: EventStore,
    Q: EventQueue,
{
    /// Creates a new define-product handler.
    pub fn new(store: S, queue: Q) -> Self {
        Self {
            pipeline: CommandPipeline::new(store, queue),
        }
    }

    /// Handles a define-product command.
    ///
    /// Validation is fail-fast in declared field order. All checks here are
    /// context-free; this command needs no external lookups.
    #[tracing::instrument(skip(self, command), fields(product_code = %command.product_code))]
    pub async fn handle(
        &self,
        command: DefineProduct,
    ) -> Result<DefineProductResponse, DefineProductError> {
        if !validation::business_key_is_valid(&command.product_code) {
            return Err(DefineProductError::InvalidProductCode);
        }
        if command.name.is_empty() || command.name.chars().count() > 64 {
            return Err(DefineProductError::InvalidName);
        }
        if !(0..=100_00).contains(&command.interest_in_basis_points) {
            return Err(DefineProductError::InvalidInterestRate);
        }
        if command.annual_fee_in_cents < 0 {
            return Err(DefineProductError::InvalidAnnualFee);
        }
        let payment_cycle: PaymentCycle = command
            .payment_cycle
            .parse()
            .map_err(|()| DefineProductError::InvalidPaymentCycle)?;
        if command.credit_limit_in_cents < 0 {
            return Err(DefineProductError::InvalidCreditLimit);
        }
        if command.max_balance_transfer_allowed_in_cents < 0 {
            return Err(DefineProductError::InvalidBalanceTransferLimit);
        }
        let reward: Reward = command
            .reward
            .parse()
            .map_err(|()| DefineProductError::InvalidReward)?;
        if !validation::hex_color_is_valid(&command.card_background_hex) {
            return Err(DefineProductError::InvalidCardBackground);
        }

        let product_id =
            AggregateId::from_business_key(Product::aggregate_type(), &command.product_code);
        let event = ProductEvent::ProductDefined(ProductDefinedData {
            product_id,
            product_code: command.product_code.clone(),
            name: command.name.clone(),
            interest_in_basis_points: command.interest_in_basis_points,
            annual_fee_in_cents: command.annual_fee_in_cents,
            payment_cycle,
            credit_limit_in_cents: command.credit_limit_in_cents,
            max_balance_transfer_allowed_in_cents: command.max_balance_transfer_allowed_in_cents,
            reward,
            card_background_hex: command.card_background_hex.clone(),
        });

        let outcome = self
            .pipeline
            .execute(product_id, command.metadata.clone(), |_product| {
                Ok::<_, DefineProductError>(vec![event])
            })
            .await?;

        metrics::counter!("commands_handled", "command" => "define_product").increment(1);
        tracing::info!(%product_id, version = %outcome.new_version, "product defined");

        Ok(DefineProductResponse { product_id })
    }
}
