use std::sync::Arc;

use atelier_catalog::product::keys;
use atelier_catalog::{PricingTier, ProvisioningRecord};
use atelier_core::{ContentGenerator, ContentRequest, Metadata, ProductProvisioner};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::models::{Template, TemplateBatch};
use crate::price_sheet::PriceSheets;
use crate::TemplateError;

const SYSTEM_PROMPT: &str =
    "You are a business template generator creating actionable, profitable business models.";

const SECTIONS: [&str; 10] = [
    "Business model overview",
    "Revenue streams (3-5 specific methods)",
    "Target market analysis",
    "Operational workflow (step-by-step)",
    "Technology stack requirements",
    "Financial projections (6-month)",
    "Marketing strategy",
    "Risk assessment",
    "Success metrics",
    "Implementation timeline",
];

/// Generates templates through the content backend and lists them for sale
pub struct TemplateOrchestrator {
    content: Arc<dyn ContentGenerator>,
    sheets: PriceSheets,
}

impl TemplateOrchestrator {
    pub fn new(content: Arc<dyn ContentGenerator>, sheets: PriceSheets) -> Self {
        Self { content, sheets }
    }

    pub fn price_sheets(&self) -> &PriceSheets {
        &self.sheets
    }

    /// Completion request for one template of `category`
    pub fn prompt_for(category: &str) -> ContentRequest {
        let sections: Vec<String> = SECTIONS
            .iter()
            .enumerate()
            .map(|(i, section)| format!("{}. {}", i + 1, section))
            .collect();

        ContentRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: format!(
                "Generate a comprehensive business template for category: {}\n\nInclude:\n{}\n\nMake it actionable and monetizable. Format as structured JSON.",
                category,
                sections.join("\n"),
            ),
        }
    }

    /// Generate `count` templates one after another
    pub async fn generate_batch(&self, category: &str, count: usize) -> Result<TemplateBatch, TemplateError> {
        self.generate_batch_at(category, count, Utc::now()).await
    }

    /// Same as [`generate_batch`](Self::generate_batch) with an explicit clock
    pub async fn generate_batch_at(
        &self,
        category: &str,
        count: usize,
        now: DateTime<Utc>,
    ) -> Result<TemplateBatch, TemplateError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(TemplateError::InvalidCategory);
        }
        if count == 0 {
            return Err(TemplateError::InvalidCount);
        }

        info!(category, count, "Generating template batch");

        let request = Self::prompt_for(category);
        let price_sheet = self.sheets.for_category(category);
        let mut batch = TemplateBatch {
            category: category.to_string(),
            templates: Vec::with_capacity(count),
            failures: Vec::new(),
        };

        for index in 0..count {
            match self.content.complete(&request).await {
                Ok(content) => batch.templates.push(Template {
                    id: Template::make_id(category, index, now),
                    category: category.to_string(),
                    index,
                    generated_at: now,
                    content,
                    price_sheet,
                }),
                Err(source) => {
                    warn!(category, index, error = %source, "Template generation failed");
                    batch.failures.push(TemplateError::Content { index, source });
                }
            }
        }

        info!(
            category,
            generated = batch.generated(),
            failed = batch.failures.len(),
            "Template batch finished"
        );
        Ok(batch)
    }

    /// List a template as an individual product at its sheet price
    pub async fn publish(
        &self,
        template: &Template,
        provisioner: &dyn ProductProvisioner,
    ) -> Result<ProvisioningRecord, TemplateError> {
        let tier = PricingTier::Individual;
        let amount = template.price_sheet.individual;

        let mut metadata = Metadata::new();
        metadata.insert("template_id".to_string(), template.id.clone());
        metadata.insert(keys::CATEGORY.to_string(), template.category.clone());
        metadata.insert(keys::TIER.to_string(), tier.to_string());
        metadata.insert(keys::NAME.to_string(), format!("Business Template {}", template.id));
        metadata.insert(keys::CURRENCY.to_string(), self.sheets.currency.clone());

        let ids = provisioner.create(&metadata, amount).await?;
        info!(template_id = %template.id, product_id = %ids.external_product_id, "Template published");

        Ok(ProvisioningRecord {
            external_product_id: ids.external_product_id,
            external_price_id: ids.external_price_id,
            tier,
            amount,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use atelier_core::{CoreError, ExternalIds, ProvisionerError};
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns numbered content, failing on the listed call numbers
    struct ScriptedContent {
        calls: AtomicUsize,
        fail_calls: Vec<usize>,
    }

    #[async_trait]
    impl ContentGenerator for ScriptedContent {
        async fn complete(&self, request: &ContentRequest) -> Result<String, CoreError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(request.prompt.contains("10. Implementation timeline"));
            if self.fail_calls.contains(&call) {
                return Err(CoreError::Unavailable("rate limited".into()));
            }
            Ok(format!("{{\"draft\": {}}}", call))
        }
    }

    struct EchoProvisioner;

    #[async_trait]
    impl ProductProvisioner for EchoProvisioner {
        async fn create(&self, metadata: &Metadata, _amount: Decimal) -> Result<ExternalIds, ProvisionerError> {
            let id = metadata.get("template_id").cloned().unwrap_or_default();
            Ok(ExternalIds {
                external_product_id: format!("prod_{}", id),
                external_price_id: format!("price_{}", id),
            })
        }
    }

    fn orchestrator(fail_calls: Vec<usize>) -> TemplateOrchestrator {
        let content = ScriptedContent {
            calls: AtomicUsize::new(0),
            fail_calls,
        };
        TemplateOrchestrator::new(Arc::new(content), PriceSheets::default())
    }

    #[tokio::test]
    async fn test_generate_batch() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        let batch = orchestrator(Vec::new()).generate_batch_at("fintech", 3, at).await.unwrap();

        assert_eq!(batch.generated(), 3);
        assert!(batch.failures.is_empty());
        assert_eq!(batch.templates[2].id, "fintech_2_20261019");
        assert_eq!(batch.templates[0].price_sheet.individual, Decimal::from(49));
        assert_eq!(batch.templates[1].content, "{\"draft\": 1}");
    }

    #[tokio::test]
    async fn test_failed_generation_is_reported_per_index() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        let batch = orchestrator(vec![1]).generate_batch_at("saas", 3, at).await.unwrap();

        assert_eq!(batch.generated(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert!(matches!(batch.failures[0], TemplateError::Content { index: 1, .. }));
        let indices: Vec<usize> = batch.templates.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let orchestrator = orchestrator(Vec::new());

        assert!(matches!(orchestrator.generate_batch("  ", 2).await, Err(TemplateError::InvalidCategory)));
        assert!(matches!(orchestrator.generate_batch("saas", 0).await, Err(TemplateError::InvalidCount)));
    }

    #[tokio::test]
    async fn test_publish_uses_individual_price() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        let orchestrator = orchestrator(Vec::new());
        let batch = orchestrator.generate_batch_at("consulting", 1, at).await.unwrap();

        let record = orchestrator.publish(&batch.templates[0], &EchoProvisioner).await.unwrap();

        assert_eq!(record.amount, Decimal::from(59));
        assert_eq!(record.tier, PricingTier::Individual);
        assert_eq!(record.external_product_id, "prod_consulting_0_20261019");
        assert_eq!(record.metadata.get("category").map(String::as_str), Some("consulting"));
    }
}
