use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CoreResult;

/// A single completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest {
    pub system: String,
    pub prompt: String,
}

/// Text generation backend (an LLM completion API in production)
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn complete(&self, request: &ContentRequest) -> CoreResult<String>;
}
