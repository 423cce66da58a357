//! Remote-preferred loading strategy.

use std::sync::Arc;

use async_trait::async_trait;
use stowage_core::{Content, Key, Storage, StoreResult};

use crate::cache::Cache;
use crate::control::CacheControl;
use crate::from_storage::FromStorageCache;
use crate::remote::Remote;

/// Always asks the remote first, keeping the cache as a write-through
/// copy and a fallback for remote outages.
///
/// On a successful fetch the result is stored and served back; on remote
/// failure the strategy serves whatever is already cached - regardless
/// of the control, since the remote is unavailable - and only surfaces
/// the remote error when the cache has nothing either.
pub struct FromRemoteCache {
    cache: FromStorageCache,
}

impl FromRemoteCache {
    /// Creates a cache over the given backing storage.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            cache: FromStorageCache::new(storage),
        }
    }
}

#[async_trait]
impl Cache for FromRemoteCache {
    async fn load(
        &self,
        key: &Key,
        remote: &dyn Remote,
        _control: &dyn CacheControl,
    ) -> StoreResult<Option<Content>> {
        match remote.fetch().await {
            Ok(Some(content)) => Ok(Some(self.cache.update(key, content).await?)),
            Ok(None) => Ok(None),
            Err(remote_err) => {
                tracing::warn!(key = ?key, error = %remote_err, "remote unavailable, falling back to cache");
                match self.cache.cached_value(key).await {
                    Ok(Some(content)) => Ok(Some(content)),
                    Ok(None) => Err(remote_err),
                    Err(cache_err) => {
                        tracing::warn!(key = ?key, error = %cache_err, "cache fallback failed as well");
                        Err(remote_err)
                    }
                }
            }
        }
    }
}
