//! The fixed credit-card product catalog.

use domain::{DefineProduct, DefineProductError, DefineProductHandler, DefineProductResponse};
use event_queue::EventQueue;
use event_store::{EventMetadata, EventStore};

/// The catalog rows every deployment starts with.
fn catalog() -> Vec<DefineProduct> {
    vec![
        DefineProduct {
            product_code: "STARTER_CREDIT_CARD".to_string(),
            name: "Starter".to_string(),
            interest_in_basis_points: 1200,
            annual_fee_in_cents: 5000,
            payment_cycle: "monthly".to_string(),
            credit_limit_in_cents: 50000,
            max_balance_transfer_allowed_in_cents: 0,
            reward: "none".to_string(),
            card_background_hex: "#7fffd4".to_string(),
            metadata: EventMetadata::new(Some("seeder".to_string())),
        },
        DefineProduct {
            product_code: "PLATINUM_CREDIT_CARD".to_string(),
            name: "Platinum".to_string(),
            interest_in_basis_points: 300,
            annual_fee_in_cents: 50000,
            payment_cycle: "monthly".to_string(),
            credit_limit_in_cents: 500000,
            max_balance_transfer_allowed_in_cents: 100000,
            reward: "points".to_string(),
            card_background_hex: "#E5E4E2".to_string(),
            metadata: EventMetadata::new(Some("seeder".to_string())),
        },
    ]
}

/// Defines every catalog row through the public `handle` contract, exactly
/// as any other caller would.
pub async fn seed_catalog<S, Q>(
    handler: &DefineProductHandler<S, Q>,
) -> Result<Vec<DefineProductResponse>, DefineProductError>
where
    S: EventStore,
    Q: EventQueue,
{
    let mut responses = Vec::new();
    for command in catalog() {
        let code = command.product_code.clone();
        let response = handler.handle(command).await?;
        tracing::info!(product_code = %code, product_id = %response.product_id, "seeded product");
        responses.push(response);
    }
    Ok(responses)
}
