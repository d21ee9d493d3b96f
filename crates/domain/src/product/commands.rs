use event_store::EventMetadata;

/// Command to define (or redefine) a credit-card product.
///
/// The product code is the stable business key the aggregate ID is derived
/// from: re-issuing this command with the same code always addresses the
/// same stream. Cycle and reward arrive as transport-level strings and are
/// parsed into typed values during validation.
#[derive(Debug, Clone)]
pub struct DefineProduct {
    /// Stable business key, e.g. `STARTER_CREDIT_CARD`.
    pub product_code: String,

    /// Display name, e.g. `Starter`.
    pub name: String,

    /// Annual interest in basis points (1200 = 12.00%).
    pub interest_in_basis_points: i64,

    /// Annual fee in cents.
    pub annual_fee_in_cents: i64,

    /// Payment cycle, e.g. `monthly`.
    pub payment_cycle: String,

    /// Credit limit in cents.
    pub credit_limit_in_cents: i64,

    /// Maximum balance transfer allowed in cents.
    pub max_balance_transfer_allowed_in_cents: i64,

    /// Reward program, e.g. `none` or `points`.
    pub reward: String,

    /// Card art background as a `#RRGGBB` hex color.
    pub card_background_hex: String,

    /// Caller/session identity and causal tracing identifiers.
    pub metadata: EventMetadata,
}
