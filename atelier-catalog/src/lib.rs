pub mod category;
pub mod pricing;
pub mod product;
pub mod inventory;
pub mod generator;

pub use category::{category_for, CategoryMap, CategoryRange, CoveragePolicy, RangeIssue, FALLBACK_CATEGORY};
pub use pricing::{PriceInput, PriceRule, PricingConfig, PricingEngine, PricingTier, TierPricing, MAX_AMOUNT};
pub use product::{BillingInterval, EntryRef, PlannedEntry, ProvisioningRecord, TierEntry};
pub use inventory::{standard_tier_entries, Catalog, InventoryItem};
pub use generator::{
    CatalogGenerator, FailurePolicy, GenerationOptions, GenerationReport, GenerationStats, Halt,
    ProvisioningError, TierTotals,
};

/// Configuration problems. Raised while a catalog, pricing engine or
/// generator is built, never during a run.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Invalid category ranges: {0}")]
    InvalidRangeConfiguration(RangeIssue),

    #[error("Invalid {tier} pricing rule: {reason}")]
    InvalidPricingRule { tier: PricingTier, reason: String },

    #[error("Invalid generation options: {0}")]
    InvalidOptions(String),
}
