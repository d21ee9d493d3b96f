use common::AggregateId;
use event_store::Version;

use crate::aggregate::Aggregate;

use super::events::{PaymentCycle, ProductEvent, Reward};

/// The credit-card product aggregate.
///
/// Folding is last-writer-wins: each `ProductDefined` event replaces the
/// definition fields wholesale, so the terminal state is always the latest
/// definition regardless of how many redefinitions precede it.
#[derive(Debug, Default)]
pub struct Product {
    id: Option<AggregateId>,
    product_code: Option<String>,
    name: Option<String>,
    interest_in_basis_points: i64,
    annual_fee_in_cents: i64,
    payment_cycle: Option<PaymentCycle>,
    credit_limit_in_cents: i64,
    max_balance_transfer_allowed_in_cents: i64,
    reward: Option<Reward>,
    card_background_hex: Option<String>,
    version: Version,
}

impl Product {
    /// The stable business key this product was defined under.
    pub fn product_code(&self) -> Option<&str> {
        self.product_code.as_deref()
    }

    /// Display name from the latest definition.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Annual interest in basis points.
    pub fn interest_in_basis_points(&self) -> i64 {
        self.interest_in_basis_points
    }

    /// Annual fee in cents.
    pub fn annual_fee_in_cents(&self) -> i64 {
        self.annual_fee_in_cents
    }

    /// Payment cycle from the latest definition.
    pub fn payment_cycle(&self) -> Option<PaymentCycle> {
        self.payment_cycle
    }

    /// Credit limit in cents.
    pub fn credit_limit_in_cents(&self) -> i64 {
        self.credit_limit_in_cents
    }

    /// Maximum balance transfer allowed in cents.
    pub fn max_balance_transfer_allowed_in_cents(&self) -> i64 {
        self.max_balance_transfer_allowed_in_cents
    }

    /// Reward program from the latest definition.
    pub fn reward(&self) -> Option<Reward> {
        self.reward
    }

    /// Card art background hex color.
    pub fn card_background_hex(&self) -> Option<&str> {
        self.card_background_hex.as_deref()
    }
}

impl Aggregate for Product {
    type Event = ProductEvent;

    fn aggregate_type() -> &'static str {
        "Product"
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
            ProductEvent::ProductDefined(data) => {
                self.id = Some(data.product_id);
                self.product_code = Some(data.product_code);
                self.name = Some(data.name);
                self.interest_in_basis_points = data.interest_in_basis_points;
                self.annual_fee_in_cents = data.annual_fee_in_cents;
                self.payment_cycle = Some(data.payment_cycle);
                self.credit_limit_in_cents = data.credit_limit_in_cents;
                self.max_balance_transfer_allowed_in_cents =
                    data.max_balance_transfer_allowed_in_cents;
                self.reward = Some(data.reward);
                self.card_background_hex = Some(data.card_background_hex);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::events::ProductDefinedData;

    fn defined(product_id: AggregateId, name: &str, interest: i64) -> ProductEvent {
        ProductEvent::ProductDefined(ProductDefinedData {
            product_id,
            product_code: "STARTER_CREDIT_CARD".to_string(),
            name: name.to_string(),
            interest_in_basis_points: interest,
            annual_fee_in_cents: 5000,
            payment_cycle: PaymentCycle::Monthly,
            credit_limit_in_cents: 50000,
            max_balance_transfer_allowed_in_cents: 0,
            reward: Reward::None,
            card_background_hex: "#7fffd4".to_string(),
        })
    }

    #[test]
    fn defined_initializes_state() {
        let product_id = AggregateId::from_business_key("Product", "STARTER_CREDIT_CARD");
        let mut product = Product::default();

        product.apply(defined(product_id, "Starter", 1200));

        assert_eq!(product.id(), Some(product_id));
        assert_eq!(product.name(), Some("Starter"));
        assert_eq!(product.interest_in_basis_points(), 1200);
        assert_eq!(product.payment_cycle(), Some(PaymentCycle::Monthly));
    }

    #[test]
    fn redefinition_replaces_fields_wholesale() {
        let product_id = AggregateId::from_business_key("Product", "STARTER_CREDIT_CARD");
        let mut product = Product::default();

        product.apply(defined(product_id, "Starter", 1200));
        product.apply(defined(product_id, "Starter v2", 900));

        assert_eq!(product.name(), Some("Starter v2"));
        assert_eq!(product.interest_in_basis_points(), 900);
    }
}
