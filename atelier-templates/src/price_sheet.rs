use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Launch prices for a generated template in one category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceSheet {
    pub individual: Decimal,
    pub bundle: Decimal,
    pub enterprise: Decimal,
}

impl PriceSheet {
    pub fn new(individual: i64, bundle: i64, enterprise: i64) -> Self {
        Self {
            individual: Decimal::from(individual),
            bundle: Decimal::from(bundle),
            enterprise: Decimal::from(enterprise),
        }
    }
}

/// Price sheets keyed by lower-cased category, with a default for the rest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSheets {
    pub currency: String,
    pub by_category: HashMap<String, PriceSheet>,
    pub default: PriceSheet,
}

impl PriceSheets {
    pub fn for_category(&self, category: &str) -> PriceSheet {
        self.by_category
            .get(&category.trim().to_lowercase())
            .copied()
            .unwrap_or(self.default)
    }
}

impl Default for PriceSheets {
    fn default() -> Self {
        let by_category = [
            ("fintech", PriceSheet::new(49, 299, 1997)),
            ("saas", PriceSheet::new(39, 249, 1497)),
            ("ecommerce", PriceSheet::new(29, 199, 997)),
            ("consulting", PriceSheet::new(59, 399, 2497)),
        ]
        .into_iter()
        .map(|(category, sheet)| (category.to_string(), sheet))
        .collect();

        Self {
            currency: "usd".to_string(),
            by_category,
            default: PriceSheet::new(25, 149, 897),
        }
    }
}
