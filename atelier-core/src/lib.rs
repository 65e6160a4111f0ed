pub mod provisioner;
pub mod content;
pub mod storage;

pub use provisioner::{ExternalIds, Metadata, ProductProvisioner, ProvisionerError};
pub use content::{ContentGenerator, ContentRequest};
pub use storage::ObjectStore;

/// Errors raised by collaborators that are not tied to a single catalog entry
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
