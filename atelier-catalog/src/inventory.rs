use serde::{Deserialize, Serialize};

use crate::category::{CategoryMap, CoveragePolicy};
use crate::product::{keys, BillingInterval, TierEntry};
use crate::pricing::PricingTier;
use crate::CatalogError;

/// An inventory item. The category is derived from the id on lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryItem {
    pub id: i64,
    pub category: String,
}

/// Everything provisioned in one run: items `1..=inventory_size` plus the
/// declared tier entries, in that order
#[derive(Debug, Clone)]
pub struct Catalog {
    inventory_size: u32,
    categories: CategoryMap,
    tiers: Vec<TierEntry>,
}

impl Catalog {
    pub fn new(
        inventory_size: u32,
        categories: CategoryMap,
        tiers: Vec<TierEntry>,
        coverage: CoveragePolicy,
    ) -> Result<Self, CatalogError> {
        if coverage == CoveragePolicy::Strict {
            categories.check_coverage(inventory_size)?;
        }
        Ok(Self {
            inventory_size,
            categories,
            tiers,
        })
    }

    /// The 487-template marketplace with its standard bundles and plans
    pub fn template_marketplace() -> Self {
        let categories = CategoryMap::template_marketplace();
        let tiers = standard_tier_entries(&categories, 487);
        Self {
            inventory_size: 487,
            categories,
            tiers,
        }
    }

    pub fn inventory_size(&self) -> u32 {
        self.inventory_size
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn tiers(&self) -> &[TierEntry] {
        &self.tiers
    }

    /// Items in id order
    pub fn items(&self) -> impl Iterator<Item = InventoryItem> + '_ {
        (1..=i64::from(self.inventory_size)).map(|id| self.categories.item(id))
    }

    /// Number of provisioner calls a full run makes
    pub fn entry_count(&self) -> usize {
        self.inventory_size as usize + self.tiers.len()
    }
}

/// One bundle per category, the vault licence, monthly and annual
/// subscriptions and the three enterprise plans
pub fn standard_tier_entries(categories: &CategoryMap, inventory_size: u32) -> Vec<TierEntry> {
    let mut entries: Vec<TierEntry> = categories
        .categories()
        .into_iter()
        .map(|category| {
            TierEntry::new(PricingTier::Bundle, category, format!("{} Template Bundle", category))
                .with_extra(keys::CATEGORY, category)
                .with_extra(keys::TEMPLATE_COUNT, categories.span_of(category, inventory_size))
        })
        .collect();

    entries.push(
        TierEntry::new(
            PricingTier::Vault,
            "vault",
            format!("Template Vault License - All {} Templates", inventory_size),
        )
        .with_extra(keys::TEMPLATE_COUNT, inventory_size)
        .with_extra("includes", "all_templates,lifetime_updates,consulting"),
    );

    for (key, interval) in [("monthly", BillingInterval::Month), ("annual", BillingInterval::Year)] {
        let title = format!("{}{}", key[..1].to_uppercase(), &key[1..]);
        entries.push(
            TierEntry::new(PricingTier::Subscription, key, format!("Template Studio {} Subscription", title))
                .with_interval(interval)
                .with_extra("templates_per_month", 10),
        );
    }

    for plan in ["starter", "growth", "enterprise"] {
        entries.push(
            TierEntry::new(
                PricingTier::Enterprise,
                plan,
                format!("Enterprise Template Development + Consulting ({})", plan),
            )
            .with_extra("includes", "custom_templates,white_label,consulting,implementation"),
        );
    }

    entries
}
