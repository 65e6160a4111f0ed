use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use atelier_core::{CoreError, CoreResult, ObjectStore};
use chrono::Utc;
use tracing::debug;

/// Object store backed by a local directory
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, key: &str) -> CoreResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(CoreError::ValidationError(format!("invalid object key: {:?}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> CoreResult<()> {
        let path = self.resolve(key)?;
        let io_err = |e: std::io::Error| CoreError::InternalError(format!("{}: {}", key, e));

        if key.ends_with('/') {
            tokio::fs::create_dir_all(&path).await.map_err(io_err)?;
        } else {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
            }
            tokio::fs::write(&path, body).await.map_err(io_err)?;
        }

        debug!(key, "Object stored");
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> CoreResult<String> {
        self.resolve(key)?;
        let expires = i64::try_from(expires_in.as_secs())
            .ok()
            .and_then(|secs| Utc::now().timestamp().checked_add(secs))
            .ok_or_else(|| CoreError::ValidationError(format!("link expiry out of range: {:?}", expires_in)))?;
        Ok(format!("{}/{}?expires={}", self.base_url, key, expires))
    }
}
