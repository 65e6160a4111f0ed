use std::sync::Arc;
use std::time::Duration;

use atelier_core::{CoreError, ObjectStore};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Folder markers created when a bucket is prepared for delivery
pub const DELIVERY_FOLDERS: [&str; 6] = [
    "templates/individual/",
    "templates/bundles/",
    "templates/vault/",
    "customization-tools/",
    "documentation/",
    "bonus-materials/",
];

/// Longest accepted download link lifetime (seven days)
pub const MAX_URL_EXPIRY_SECONDS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    pub bucket: String,
    /// Lifetime of a download link
    #[serde(default = "default_url_expiry")]
    pub url_expiry_seconds: u64,
}

fn default_url_expiry() -> u64 { 3600 }

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            bucket: "atelier-templates".to_string(),
            url_expiry_seconds: default_url_expiry(),
        }
    }
}

/// Outcome of preparing the folder layout; individual folders may fail
#[derive(Debug, Default, Serialize)]
pub struct LayoutReport {
    pub created: Vec<String>,
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadLink {
    pub key: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Digital delivery of purchased templates through object storage
pub struct DeliveryService {
    store: Arc<dyn ObjectStore>,
    config: DeliveryConfig,
}

impl DeliveryService {
    pub fn new(store: Arc<dyn ObjectStore>, config: DeliveryConfig) -> Result<Self, DeliveryError> {
        if !(1..=MAX_URL_EXPIRY_SECONDS).contains(&config.url_expiry_seconds) {
            return Err(DeliveryError::InvalidExpiry(config.url_expiry_seconds));
        }
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Write an empty marker object for every delivery folder
    pub async fn setup_layout(&self) -> LayoutReport {
        let mut report = LayoutReport::default();

        for folder in DELIVERY_FOLDERS {
            match self.store.put_object(folder, Vec::new()).await {
                Ok(()) => report.created.push(folder.to_string()),
                Err(e) => {
                    warn!(folder, error = %e, "Could not create delivery folder");
                    report.failed.push((folder.to_string(), e.to_string()));
                }
            }
        }

        info!(
            bucket = %self.config.bucket,
            created = report.created.len(),
            failed = report.failed.len(),
            "Delivery layout prepared"
        );
        report
    }

    /// Package key for a customer's download at `at`
    pub fn package_key(customer_id: &str, at: DateTime<Utc>) -> Result<String, DeliveryError> {
        let customer_id = customer_id.trim();
        if customer_id.is_empty() || customer_id.contains('/') {
            return Err(DeliveryError::InvalidCustomer(customer_id.to_string()));
        }
        Ok(format!("packages/{}_{}.zip", customer_id, at.format("%Y%m%d_%H%M%S")))
    }

    /// Presigned link to the customer's package, valid for the configured expiry
    pub async fn download_link(&self, customer_id: &str, at: DateTime<Utc>) -> Result<DownloadLink, DeliveryError> {
        let key = Self::package_key(customer_id, at)?;
        let seconds = self.config.url_expiry_seconds;
        let expires_at = i64::try_from(seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| at.checked_add_signed(ttl))
            .ok_or(DeliveryError::InvalidExpiry(seconds))?;
        let url = self.store.presign_get(&key, Duration::from_secs(seconds)).await?;

        Ok(DownloadLink { key, url, expires_at })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid customer id: {0:?}")]
    InvalidCustomer(String),

    #[error("Download link expiry of {0}s is outside 1..={max}s", max = MAX_URL_EXPIRY_SECONDS)]
    InvalidExpiry(u64),

    #[error("Storage error: {0}")]
    Storage(#[from] CoreError),
}
