use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::CatalogError;

/// Largest base, weight or amount a rule may declare
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Named pricing categories of the marketplace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PricingTier {
    Individual,
    Bundle,
    Vault,
    Subscription,
    Enterprise,
}

impl PricingTier {
    pub const ALL: [PricingTier; 5] = [
        PricingTier::Individual,
        PricingTier::Bundle,
        PricingTier::Vault,
        PricingTier::Subscription,
        PricingTier::Enterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PricingTier::Individual => "individual",
            PricingTier::Bundle => "bundle",
            PricingTier::Vault => "vault",
            PricingTier::Subscription => "subscription",
            PricingTier::Enterprise => "enterprise",
        }
    }
}

impl std::fmt::Display for PricingTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to a price rule: the item id (when pricing a per-item entry) and the
/// entry's key label
#[derive(Debug, Clone, Copy)]
pub struct PriceInput<'a> {
    pub id: Option<i64>,
    pub key: &'a str,
}

impl<'a> PriceInput<'a> {
    pub fn item(id: i64, category: &'a str) -> Self {
        Self { id: Some(id), key: category }
    }

    pub fn keyed(key: &'a str) -> Self {
        Self { id: None, key }
    }
}

/// How a tier's price varies with its input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceRule {
    /// Same amount for every input
    Fixed { amount: Decimal },
    /// `base + (id mod spread)`; entries without an id pay `base`
    Modulo { base: Decimal, spread: u32 },
    /// `base + weight * len(key)`, length counted in characters
    Weighted { base: Decimal, weight: Decimal },
    /// Lookup by key with a fallback amount
    Keyed {
        amounts: BTreeMap<String, Decimal>,
        fallback: Decimal,
    },
}

impl PriceRule {
    /// Evaluate the rule. Pure, and never below zero.
    pub fn evaluate(&self, input: &PriceInput<'_>) -> Decimal {
        let raw = match self {
            PriceRule::Fixed { amount } => *amount,
            PriceRule::Modulo { base, spread } => {
                let offset = input
                    .id
                    .map(|id| id.rem_euclid(i64::from((*spread).max(1))))
                    .unwrap_or(0);
                base.checked_add(Decimal::from(offset)).unwrap_or(Decimal::MAX)
            }
            PriceRule::Weighted { base, weight } => {
                let chars = Decimal::from(input.key.chars().count() as u64);
                weight
                    .checked_mul(chars)
                    .and_then(|scaled| base.checked_add(scaled))
                    .unwrap_or(Decimal::MAX)
            }
            PriceRule::Keyed { amounts, fallback } => {
                amounts.get(input.key).copied().unwrap_or(*fallback)
            }
        };
        raw.max(Decimal::ZERO)
    }

    fn validate(&self, tier: PricingTier) -> Result<(), CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidPricingRule { tier, reason };

        if let Some(value) = self.declared_values().find(|v| **v > MAX_AMOUNT) {
            return Err(invalid(format!("{} exceeds the maximum of {}", value, MAX_AMOUNT)));
        }

        match self {
            PriceRule::Fixed { amount } if amount.is_sign_negative() => {
                Err(invalid(format!("fixed amount {} is negative", amount)))
            }
            PriceRule::Modulo { spread: 0, .. } => Err(invalid("modulo spread must be at least 1".into())),
            PriceRule::Modulo { base, .. } if base.is_sign_negative() => {
                Err(invalid(format!("base {} is negative", base)))
            }
            PriceRule::Weighted { base, weight } if base.is_sign_negative() || weight.is_sign_negative() => {
                Err(invalid(format!("base {} / weight {} must not be negative", base, weight)))
            }
            PriceRule::Keyed { amounts, fallback } => {
                if fallback.is_sign_negative() {
                    return Err(invalid(format!("fallback {} is negative", fallback)));
                }
                match amounts.iter().find(|(_, amount)| amount.is_sign_negative()) {
                    Some((key, amount)) => Err(invalid(format!("amount {} for '{}' is negative", amount, key))),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    fn declared_values(&self) -> Box<dyn Iterator<Item = &Decimal> + '_> {
        match self {
            PriceRule::Fixed { amount } => Box::new(std::iter::once(amount)),
            PriceRule::Modulo { base, .. } => Box::new(std::iter::once(base)),
            PriceRule::Weighted { base, weight } => Box::new([base, weight].into_iter()),
            PriceRule::Keyed { amounts, fallback } => Box::new(amounts.values().chain(std::iter::once(fallback))),
        }
    }
}

/// Price rule plus the marketplace commission taken on each sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierPricing {
    pub rule: PriceRule,
    #[serde(default)]
    pub commission: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingConfig {
    /// ISO currency code handed to the provisioner
    pub currency: String,
    pub individual: TierPricing,
    pub bundle: TierPricing,
    pub vault: TierPricing,
    pub subscription: TierPricing,
    pub enterprise: TierPricing,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let keyed = |pairs: &[(&str, i64)], fallback: i64| PriceRule::Keyed {
            amounts: pairs
                .iter()
                .map(|(key, amount)| (key.to_string(), Decimal::from(*amount)))
                .collect(),
            fallback: Decimal::from(fallback),
        };

        Self {
            currency: "usd".to_string(),
            individual: TierPricing {
                rule: PriceRule::Modulo { base: Decimal::from(25), spread: 25 },
                commission: Decimal::new(10, 2),
            },
            bundle: TierPricing {
                rule: PriceRule::Weighted { base: Decimal::from(199), weight: Decimal::from(10) },
                commission: Decimal::new(15, 2),
            },
            vault: TierPricing {
                rule: PriceRule::Fixed { amount: Decimal::from(997) },
                commission: Decimal::new(20, 2),
            },
            subscription: TierPricing {
                rule: keyed(&[("monthly", 47), ("annual", 470)], 47),
                commission: Decimal::new(30, 2),
            },
            enterprise: TierPricing {
                rule: keyed(&[("starter", 1997), ("growth", 2997), ("enterprise", 4997)], 1997),
                commission: Decimal::new(25, 2),
            },
        }
    }
}

impl PricingConfig {
    pub fn tier(&self, tier: PricingTier) -> &TierPricing {
        match tier {
            PricingTier::Individual => &self.individual,
            PricingTier::Bundle => &self.bundle,
            PricingTier::Vault => &self.vault,
            PricingTier::Subscription => &self.subscription,
            PricingTier::Enterprise => &self.enterprise,
        }
    }
}

/// Deterministic catalog pricing
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    /// Validate every tier rule up front
    pub fn new(config: PricingConfig) -> Result<Self, CatalogError> {
        if config.currency.trim().is_empty() {
            return Err(CatalogError::InvalidOptions("currency must not be empty".into()));
        }
        for tier in PricingTier::ALL {
            let pricing = config.tier(tier);
            pricing.rule.validate(tier)?;
            if pricing.commission.is_sign_negative() || pricing.commission > Decimal::ONE {
                return Err(CatalogError::InvalidPricingRule {
                    tier,
                    reason: format!("commission {} is outside [0, 1]", pricing.commission),
                });
            }
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    /// Price of one entry of `tier`
    pub fn price(&self, tier: PricingTier, input: &PriceInput<'_>) -> Decimal {
        self.config.tier(tier).rule.evaluate(input)
    }

    /// Marketplace share of a sale at `amount`, rounded to cents
    pub fn commission(&self, tier: PricingTier, amount: Decimal) -> Decimal {
        amount
            .checked_mul(self.config.tier(tier).commission)
            .unwrap_or(Decimal::MAX)
            .round_dp(2)
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self {
            config: PricingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_individual_price_varies_with_id() {
        let engine = PricingEngine::default();

        assert_eq!(engine.price(PricingTier::Individual, &PriceInput::item(1, "A")), Decimal::from(26));
        assert_eq!(engine.price(PricingTier::Individual, &PriceInput::item(25, "A")), Decimal::from(25));
        assert_eq!(engine.price(PricingTier::Individual, &PriceInput::item(49, "A")), Decimal::from(49));
    }

    #[test]
    fn test_prices_are_deterministic_and_non_negative() {
        let engine = PricingEngine::default();

        for id in [-500, -1, 0, 1, 7, 487, i64::MAX] {
            for tier in PricingTier::ALL {
                let input = PriceInput::item(id, "Financial Services");
                let first = engine.price(tier, &input);
                let second = engine.price(tier, &input);
                assert_eq!(first, second);
                assert!(first >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn test_vault_is_fixed() {
        let engine = PricingEngine::default();

        for id in 1..=50 {
            assert_eq!(engine.price(PricingTier::Vault, &PriceInput::item(id, "any")), Decimal::from(997));
        }
        assert_eq!(engine.price(PricingTier::Vault, &PriceInput::keyed("vault")), Decimal::from(997));
    }

    #[test]
    fn test_bundle_weighted_by_label_length() {
        let engine = PricingEngine::default();

        // 18 characters
        let price = engine.price(PricingTier::Bundle, &PriceInput::keyed("Financial Services"));
        assert_eq!(price, Decimal::from(199 + 180));
    }

    #[test]
    fn test_keyed_rules() {
        let engine = PricingEngine::default();

        assert_eq!(engine.price(PricingTier::Subscription, &PriceInput::keyed("annual")), Decimal::from(470));
        assert_eq!(engine.price(PricingTier::Subscription, &PriceInput::keyed("weekly")), Decimal::from(47));
        assert_eq!(engine.price(PricingTier::Enterprise, &PriceInput::keyed("growth")), Decimal::from(2997));
    }

    #[test]
    fn test_commission() {
        let engine = PricingEngine::default();

        assert_eq!(engine.commission(PricingTier::Vault, Decimal::from(997)), Decimal::new(19940, 2));
        assert_eq!(engine.commission(PricingTier::Individual, Decimal::from(33)), Decimal::new(330, 2));
    }

    #[test]
    fn test_rejects_invalid_rules() {
        let mut config = PricingConfig::default();
        config.individual.rule = PriceRule::Modulo { base: Decimal::from(25), spread: 0 };
        assert!(matches!(
            PricingEngine::new(config),
            Err(CatalogError::InvalidPricingRule { tier: PricingTier::Individual, .. })
        ));

        let mut config = PricingConfig::default();
        config.vault.rule = PriceRule::Fixed { amount: Decimal::from(-1) };
        assert!(PricingEngine::new(config).is_err());

        let mut config = PricingConfig::default();
        config.bundle.commission = Decimal::from(2);
        assert!(matches!(
            PricingEngine::new(config),
            Err(CatalogError::InvalidPricingRule { tier: PricingTier::Bundle, .. })
        ));
    }

    #[test]
    fn test_rejects_amounts_above_maximum() {
        let mut config = PricingConfig::default();
        config.bundle.rule = PriceRule::Weighted { base: Decimal::from(199), weight: Decimal::MAX };
        assert!(matches!(
            PricingEngine::new(config),
            Err(CatalogError::InvalidPricingRule { tier: PricingTier::Bundle, .. })
        ));

        let mut config = PricingConfig::default();
        config.enterprise.rule = PriceRule::Keyed {
            amounts: BTreeMap::from([("starter".to_string(), MAX_AMOUNT + Decimal::ONE)]),
            fallback: Decimal::from(1997),
        };
        assert!(PricingEngine::new(config).is_err());

        let mut config = PricingConfig::default();
        config.vault.rule = PriceRule::Fixed { amount: MAX_AMOUNT };
        assert!(PricingEngine::new(config).is_ok());
    }

    #[test]
    fn test_evaluate_saturates_instead_of_overflowing() {
        let weighted = PriceRule::Weighted { base: Decimal::from(199), weight: Decimal::MAX };
        assert_eq!(weighted.evaluate(&PriceInput::keyed("Financial Services")), Decimal::MAX);

        let modulo = PriceRule::Modulo { base: Decimal::MAX, spread: 25 };
        assert_eq!(modulo.evaluate(&PriceInput::item(24, "A")), Decimal::MAX);
    }
}
