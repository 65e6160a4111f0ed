use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// String metadata attached to a provisioned product.
///
/// Ordered so that two runs over the same catalog hand identical payloads to
/// the provisioner.
pub type Metadata = BTreeMap<String, String>;

/// Identifiers returned by the downstream payment system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalIds {
    pub external_product_id: String,
    pub external_price_id: String,
}

/// Failure reported by a provisioner for a single create call
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ProvisionerError {
    #[error("Rejected by provider: {0}")]
    Rejected(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Provisioning failed: {0}")]
    Other(String),
}

/// Creates sellable product/price pairs in a downstream payment system.
///
/// Implementations own their retry and rate-limit policy; callers issue at
/// most one `create` per catalog entry.
#[async_trait]
pub trait ProductProvisioner: Send + Sync {
    /// Create a product priced at `amount` (major currency units)
    async fn create(
        &self,
        metadata: &Metadata,
        amount: Decimal,
    ) -> Result<ExternalIds, ProvisionerError>;
}
