use serde::Deserialize;
use std::env;

use atelier_catalog::{
    standard_tier_entries, Catalog, CatalogError, CategoryMap, CategoryRange, CoveragePolicy,
    GenerationOptions, PricingConfig, TierEntry,
};
use atelier_fulfillment::DeliveryConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub pricing: PricingConfig,
    #[serde(default)]
    pub generation: GenerationOptions,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub inventory_size: u32,
    #[serde(default)]
    pub coverage: CoveragePolicy,
    pub ranges: Vec<CategoryRange>,
    /// Omitted: one bundle per category plus the standard vault,
    /// subscription and enterprise entries
    #[serde(default)]
    pub tiers: Option<Vec<TierEntry>>,
}

impl CatalogConfig {
    /// Validate the ranges and assemble the catalog
    pub fn build(&self) -> Result<Catalog, CatalogError> {
        let categories = CategoryMap::new(self.ranges.clone())?;
        let tiers = match &self.tiers {
            Some(tiers) => tiers.clone(),
            None => standard_tier_entries(&categories, self.inventory_size),
        };
        Catalog::new(self.inventory_size, categories, tiers, self.coverage)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory backing the local object store
    pub root: String,
    /// Prefix of generated download URLs
    pub base_url: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(dir: &str) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name(&format!("{}/default", dir)))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name(&format!("{}/local", dir)).required(false))
            // Eg. `ATELIER__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("ATELIER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_catalog::{FailurePolicy, PricingTier};

    fn shipped() -> Config {
        Config::load_from(concat!(env!("CARGO_MANIFEST_DIR"), "/../config")).unwrap()
    }

    #[test]
    fn test_shipped_config_matches_marketplace() {
        let config = shipped();
        let catalog = config.catalog.build().unwrap();
        let reference = Catalog::template_marketplace();

        assert_eq!(catalog.inventory_size(), 487);
        assert_eq!(catalog.categories(), reference.categories());
        assert_eq!(catalog.tiers(), reference.tiers());
        assert_eq!(config.generation.failure_policy, FailurePolicy::ContinueOnError);
        assert_eq!(config.delivery.url_expiry_seconds, 3600);
    }

    #[test]
    fn test_shipped_pricing_matches_defaults() {
        let config = shipped();
        let defaults = PricingConfig::default();

        for tier in PricingTier::ALL {
            assert_eq!(config.pricing.tier(tier).rule, defaults.tier(tier).rule, "{} rule", tier);
        }
        assert_eq!(config.pricing.currency, "usd");
    }

    #[test]
    fn test_invalid_ranges_fail_to_build() {
        let config = CatalogConfig {
            inventory_size: 10,
            coverage: CoveragePolicy::Strict,
            ranges: vec![CategoryRange::new(1, 6, "A"), CategoryRange::new(5, 10, "B")],
            tiers: None,
        };
        assert!(config.build().is_err());
    }
}
