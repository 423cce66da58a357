//! Cache validity policies.

use std::sync::Arc;

use async_trait::async_trait;
use stowage_core::{Key, StoreResult};

use crate::remote::Remote;

/// Decides whether cached content may be served without refreshing.
///
/// A control is a pure policy: it holds no persisted state and judges
/// only the key and the bytes reachable through the accessor a strategy
/// hands it. Which bytes those are is the strategy's choice -
/// [`FromStorageCache`](crate::FromStorageCache) passes an accessor that
/// reads the *cached* value.
#[async_trait]
pub trait CacheControl: Send + Sync {
    /// Returns `true` if the cached item may be served.
    ///
    /// # Errors
    ///
    /// Accessor failures bubble up; strategies treat them as "not valid"
    /// and degrade to a miss.
    async fn validate(&self, key: &Key, content: &dyn Remote) -> StoreResult<bool>;
}

/// Constant validity policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standard {
    /// Cached content is always valid.
    Always,
    /// Cached content is never valid; every load refreshes from remote.
    NoCache,
}

#[async_trait]
impl CacheControl for Standard {
    async fn validate(&self, _key: &Key, _content: &dyn Remote) -> StoreResult<bool> {
        Ok(matches!(self, Standard::Always))
    }
}

/// Composes policies by logical AND, short-circuiting on the first
/// failure.
pub struct All {
    controls: Vec<Arc<dyn CacheControl>>,
}

impl All {
    /// Creates a conjunction of the given policies.
    ///
    /// An empty conjunction is always valid.
    #[must_use]
    pub fn new(controls: Vec<Arc<dyn CacheControl>>) -> Self {
        Self { controls }
    }
}

#[async_trait]
impl CacheControl for All {
    async fn validate(&self, key: &Key, content: &dyn Remote) -> StoreResult<bool> {
        for control in &self.controls {
            if !control.validate(key, content).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
