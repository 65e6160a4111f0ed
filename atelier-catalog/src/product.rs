use atelier_core::Metadata;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::PricingTier;

/// Metadata keys written for every catalog entry
pub mod keys {
    pub const ID: &str = "id";
    pub const CATEGORY: &str = "category";
    pub const TIER: &str = "tier";
    pub const KEY: &str = "key";
    pub const NAME: &str = "name";
    pub const CURRENCY: &str = "currency";
    pub const INTERVAL: &str = "interval";
    pub const TEMPLATE_COUNT: &str = "template_count";
}

/// Billing period of a recurring price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    Month,
    Year,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Month => "month",
            BillingInterval::Year => "year",
        }
    }
}

/// A declared, non-per-item catalog entry (bundle, vault, subscription, enterprise)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierEntry {
    pub tier: PricingTier,
    /// Input key for the tier's price rule (category name, interval, plan)
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub interval: Option<BillingInterval>,
    #[serde(default)]
    pub extra: Metadata,
}

impl TierEntry {
    pub fn new(tier: PricingTier, key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tier,
            key: key.into(),
            name: name.into(),
            interval: None,
            extra: Metadata::new(),
        }
    }

    pub fn with_interval(mut self, interval: BillingInterval) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_extra(mut self, key: &str, value: impl ToString) -> Self {
        self.extra.insert(key.to_string(), value.to_string());
        self
    }
}

/// Identifies one entry of a catalog run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryRef {
    Item { id: i64 },
    Tier { tier: PricingTier, key: String },
}

impl std::fmt::Display for EntryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryRef::Item { id } => write!(f, "item #{}", id),
            EntryRef::Tier { tier, key } => write!(f, "{} '{}'", tier, key),
        }
    }
}

/// A priced entry ready to be handed to the provisioner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedEntry {
    pub entry: EntryRef,
    pub tier: PricingTier,
    pub amount: Decimal,
    pub metadata: Metadata,
}

/// The outcome of provisioning one catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvisioningRecord {
    pub external_product_id: String,
    pub external_price_id: String,
    pub tier: PricingTier,
    pub amount: Decimal,
    pub metadata: Metadata,
}

impl ProvisioningRecord {
    pub fn item_id(&self) -> Option<i64> {
        self.metadata.get(keys::ID).and_then(|id| id.parse().ok())
    }
}
