use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::price_sheet::PriceSheet;

/// A generated business template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// `{category}_{index}_{YYYYMMDD}`
    pub id: String,
    pub category: String,
    pub index: usize,
    pub generated_at: DateTime<Utc>,
    pub content: String,
    pub price_sheet: PriceSheet,
}

impl Template {
    pub fn make_id(category: &str, index: usize, at: DateTime<Utc>) -> String {
        format!("{}_{}_{}", category, index, at.format("%Y%m%d"))
    }
}

/// Result of one batch. Failed indices are reported next to the successes.
#[derive(Debug)]
pub struct TemplateBatch {
    pub category: String,
    pub templates: Vec<Template>,
    pub failures: Vec<crate::TemplateError>,
}

impl TemplateBatch {
    /// Templates produced by this batch
    pub fn generated(&self) -> usize {
        self.templates.len()
    }
}
