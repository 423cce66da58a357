//! Cache-preferred loading strategy.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use stowage_core::{Content, Key, Storage, StoreError, StoreResult};

use crate::cache::Cache;
use crate::control::CacheControl;
use crate::remote::Remote;

/// Serves from the cache storage when the control approves, refreshing
/// from the remote otherwise.
///
/// Cache-side failures (existence checks, reads, validation) are logged
/// and degrade to a miss - the load falls through to the remote rather
/// than failing. A successful remote fetch is drained, written back
/// size-annotated, and served from the freshly stored value.
pub struct FromStorageCache {
    storage: Arc<dyn Storage>,
}

impl FromStorageCache {
    /// Creates a cache over the given backing storage.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// An accessor reading the currently cached value, for handing to a
    /// [`CacheControl`].
    fn cached_accessor(&self, key: &Key) -> impl Remote + 'static {
        let storage = Arc::clone(&self.storage);
        let key = key.clone();
        move || {
            let storage = Arc::clone(&storage);
            let key = key.clone();
            async move {
                match storage.value(&key).await {
                    Ok(content) => Ok(Some(content)),
                    Err(StoreError::NotFound { .. }) => Ok(None),
                    Err(err) => Err(err),
                }
            }
            .boxed()
        }
    }

    /// The cached value, or `None` if absent.
    pub(crate) async fn cached_value(&self, key: &Key) -> StoreResult<Option<Content>> {
        if !self.storage.exists(key).await? {
            return Ok(None);
        }
        match self.storage.value(key).await {
            Ok(content) => Ok(Some(content)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Drains `content` into the cache storage and serves the stored
    /// value back, size-annotated.
    pub(crate) async fn update(&self, key: &Key, content: Content) -> StoreResult<Content> {
        let bytes = content.read_all().await?;
        self.storage.save(key, Content::from_bytes(bytes)).await?;
        self.storage.value(key).await
    }

    async fn validated_cached(
        &self,
        key: &Key,
        control: &dyn CacheControl,
    ) -> StoreResult<Option<Content>> {
        if !self.storage.exists(key).await? {
            return Ok(None);
        }
        let accessor = self.cached_accessor(key);
        if !control.validate(key, &accessor).await? {
            return Ok(None);
        }
        self.cached_value(key).await
    }
}

#[async_trait]
impl Cache for FromStorageCache {
    async fn load(
        &self,
        key: &Key,
        remote: &dyn Remote,
        control: &dyn CacheControl,
    ) -> StoreResult<Option<Content>> {
        match self.validated_cached(key, control).await {
            Ok(Some(content)) => return Ok(Some(content)),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(key = ?key, error = %err, "cache read failed, treating as a miss");
            }
        }

        match remote.fetch().await? {
            Some(content) => Ok(Some(self.update(key, content).await?)),
            None => Ok(None),
        }
    }
}
