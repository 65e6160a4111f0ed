use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use atelier_core::{ExternalIds, Metadata, ProductProvisioner, ProvisionerError};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

/// Provisioner that mints identifiers locally instead of calling a payment
/// provider. Useful for previews and local runs.
#[derive(Debug, Default)]
pub struct DryRunProvisioner {
    created: AtomicUsize,
}

impl DryRunProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Products minted so far
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ProductProvisioner for DryRunProvisioner {
    async fn create(&self, metadata: &Metadata, amount: Decimal) -> Result<ExternalIds, ProvisionerError> {
        let ids = ExternalIds {
            external_product_id: format!("prod_dry_{}", Uuid::new_v4().simple()),
            external_price_id: format!("price_dry_{}", Uuid::new_v4().simple()),
        };
        self.created.fetch_add(1, Ordering::Relaxed);
        debug!(
            name = metadata.get("name").map(String::as_str).unwrap_or_default(),
            %amount,
            product_id = %ids.external_product_id,
            "Dry-run product minted"
        );
        Ok(ids)
    }
}
