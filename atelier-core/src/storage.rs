use async_trait::async_trait;
use std::time::Duration;

use crate::CoreResult;

/// Object storage used for digital delivery
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` under `key`, replacing any existing object
    async fn put_object(&self, key: &str, body: Vec<u8>) -> CoreResult<()>;

    /// Produce a time-limited read URL for `key`
    async fn presign_get(&self, key: &str, expires_in: Duration) -> CoreResult<String>;
}
