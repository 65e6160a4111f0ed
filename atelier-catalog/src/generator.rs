use std::collections::BTreeMap;
use std::sync::Arc;

use atelier_core::{Metadata, ProductProvisioner, ProvisionerError};
use futures::future;
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::inventory::Catalog;
use crate::pricing::{PriceInput, PricingEngine, PricingTier};
use crate::product::{keys, EntryRef, PlannedEntry, ProvisioningRecord};
use crate::CatalogError;

/// What a run does after a provisioner failure
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the error and keep provisioning the remaining entries
    #[default]
    ContinueOnError,
    /// Stop issuing calls after the first error
    FailFast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum provisioner calls in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn default_concurrency() -> usize { 4 }

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// A provisioner failure tied to the catalog entry that caused it
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Provisioning failed for {entry}: {cause}")]
pub struct ProvisioningError {
    pub entry: EntryRef,
    #[source]
    pub cause: ProvisionerError,
}

/// Why a run stopped before every entry was issued
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Halt {
    Cancelled,
    FailFast { entry: EntryRef },
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct GenerationStats {
    pub planned: usize,
    pub provisioned: usize,
    pub failed: usize,
    /// Entries never handed to the provisioner
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TierTotals {
    pub tier: PricingTier,
    pub count: usize,
    pub gross: Decimal,
    pub commission: Decimal,
}

/// Result of a run: every successful record and every per-entry error, both
/// in declaration order
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub records: Vec<ProvisioningRecord>,
    pub errors: Vec<ProvisioningError>,
    pub stats: GenerationStats,
    pub totals: Vec<TierTotals>,
    pub halted: Option<Halt>,
}

impl GenerationReport {
    /// True when every planned entry was provisioned
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty() && self.halted.is_none() && self.stats.skipped == 0
    }
}

impl Serialize for ProvisioningError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ProvisioningError", 2)?;
        state.serialize_field("entry", &self.entry)?;
        state.serialize_field("cause", &self.cause.to_string())?;
        state.end()
    }
}

/// Prices a catalog and realises it through the injected provisioner
pub struct CatalogGenerator {
    pricing: PricingEngine,
    provisioner: Arc<dyn ProductProvisioner>,
    options: GenerationOptions,
}

impl CatalogGenerator {
    pub fn new(
        pricing: PricingEngine,
        provisioner: Arc<dyn ProductProvisioner>,
        options: GenerationOptions,
    ) -> Result<Self, CatalogError> {
        if options.concurrency == 0 {
            return Err(CatalogError::InvalidOptions("concurrency must be at least 1".into()));
        }
        Ok(Self {
            pricing,
            provisioner,
            options,
        })
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    /// Price every entry without calling out. Items first, then tier entries,
    /// each in declared order.
    pub fn plan(&self, catalog: &Catalog) -> Vec<PlannedEntry> {
        let currency = self.pricing.currency();
        let mut planned = Vec::with_capacity(catalog.entry_count());

        for item in catalog.items() {
            let tier = PricingTier::Individual;
            let amount = self.pricing.price(tier, &PriceInput::item(item.id, &item.category));

            let mut metadata = Metadata::new();
            metadata.insert(keys::ID.to_string(), item.id.to_string());
            metadata.insert(keys::NAME.to_string(), format!("Business Template #{:03}", item.id));
            metadata.insert(keys::TIER.to_string(), tier.to_string());
            metadata.insert(keys::CURRENCY.to_string(), currency.to_string());
            metadata.insert(keys::CATEGORY.to_string(), item.category);

            planned.push(PlannedEntry {
                entry: EntryRef::Item { id: item.id },
                tier,
                amount,
                metadata,
            });
        }

        for entry in catalog.tiers() {
            let amount = self.pricing.price(entry.tier, &PriceInput::keyed(&entry.key));

            let mut metadata = entry.extra.clone();
            metadata.insert(keys::TIER.to_string(), entry.tier.to_string());
            metadata.insert(keys::KEY.to_string(), entry.key.clone());
            metadata.insert(keys::NAME.to_string(), entry.name.clone());
            metadata.insert(keys::CURRENCY.to_string(), currency.to_string());
            if let Some(interval) = entry.interval {
                metadata.insert(keys::INTERVAL.to_string(), interval.as_str().to_string());
            }

            planned.push(PlannedEntry {
                entry: EntryRef::Tier {
                    tier: entry.tier,
                    key: entry.key.clone(),
                },
                tier: entry.tier,
                amount,
                metadata,
            });
        }

        planned
    }

    /// Provision the whole catalog.
    ///
    /// Calls run up to `concurrency` at a time but results are reassembled in
    /// declaration order. Cancelling `cancel` stops new calls; in-flight calls
    /// complete and are reported.
    pub async fn generate(&self, catalog: &Catalog, cancel: &CancellationToken) -> GenerationReport {
        let planned = self.plan(catalog);
        let total = planned.len();
        info!(
            entries = total,
            concurrency = self.options.concurrency,
            policy = ?self.options.failure_policy,
            "Starting catalog generation"
        );

        let halt = cancel.child_token();
        let gate = halt.clone();
        let mut outcomes = std::pin::pin!(stream::iter(planned)
            .take_while(move |_| future::ready(!gate.is_cancelled()))
            .map(|entry| self.provision(entry))
            .buffered(self.options.concurrency));

        let mut records = Vec::new();
        let mut errors = Vec::new();
        let mut halted = None;

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(entry = %err.entry, error = %err.cause, "Catalog entry failed");
                    if self.options.failure_policy == FailurePolicy::FailFast && halted.is_none() {
                        halted = Some(Halt::FailFast { entry: err.entry.clone() });
                        halt.cancel();
                    }
                    errors.push(err);
                }
            }
        }

        let stats = GenerationStats {
            planned: total,
            provisioned: records.len(),
            failed: errors.len(),
            skipped: total - records.len() - errors.len(),
        };
        if halted.is_none() && stats.skipped > 0 && cancel.is_cancelled() {
            halted = Some(Halt::Cancelled);
        }

        info!(
            provisioned = stats.provisioned,
            failed = stats.failed,
            skipped = stats.skipped,
            "Catalog generation finished"
        );

        GenerationReport {
            totals: self.totals(&records),
            records,
            errors,
            stats,
            halted,
        }
    }

    async fn provision(&self, planned: PlannedEntry) -> Result<ProvisioningRecord, ProvisioningError> {
        debug!(entry = %planned.entry, amount = %planned.amount, "Provisioning catalog entry");

        match self.provisioner.create(&planned.metadata, planned.amount).await {
            Ok(ids) => Ok(ProvisioningRecord {
                external_product_id: ids.external_product_id,
                external_price_id: ids.external_price_id,
                tier: planned.tier,
                amount: planned.amount,
                metadata: planned.metadata,
            }),
            Err(cause) => Err(ProvisioningError {
                entry: planned.entry,
                cause,
            }),
        }
    }

    fn totals(&self, records: &[ProvisioningRecord]) -> Vec<TierTotals> {
        let mut by_tier: BTreeMap<PricingTier, TierTotals> = BTreeMap::new();
        for record in records {
            let totals = by_tier.entry(record.tier).or_insert_with(|| TierTotals {
                tier: record.tier,
                count: 0,
                gross: Decimal::ZERO,
                commission: Decimal::ZERO,
            });
            totals.count += 1;
            // Saturate rather than panic on absurd sums
            totals.gross = totals.gross.checked_add(record.amount).unwrap_or(Decimal::MAX);
            totals.commission = totals
                .commission
                .checked_add(self.pricing.commission(record.tier, record.amount))
                .unwrap_or(Decimal::MAX);
        }
        by_tier.into_values().collect()
    }
}
