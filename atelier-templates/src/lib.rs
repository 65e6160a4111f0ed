pub mod models;
pub mod price_sheet;
pub mod orchestrator;

pub use models::{Template, TemplateBatch};
pub use price_sheet::{PriceSheet, PriceSheets};
pub use orchestrator::TemplateOrchestrator;

use atelier_core::{CoreError, ProvisionerError};

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template category must not be empty")]
    InvalidCategory,

    #[error("Batch size must be at least 1")]
    InvalidCount,

    #[error("Content generation failed for template {index}: {source}")]
    Content {
        index: usize,
        #[source]
        source: CoreError,
    },

    #[error("Publishing failed: {0}")]
    Publish(#[from] ProvisionerError),
}
