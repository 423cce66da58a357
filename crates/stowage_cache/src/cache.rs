//! Cache contract definition.

use async_trait::async_trait;
use stowage_core::{Content, Key, StoreResult};

use crate::control::CacheControl;
use crate::remote::Remote;

/// A read-through content cache.
///
/// Strategies differ in which source they prefer; see
/// [`FromStorageCache`](crate::FromStorageCache) (cache-preferred) and
/// [`FromRemoteCache`](crate::FromRemoteCache) (remote-preferred).
#[async_trait]
pub trait Cache: Send + Sync {
    /// Loads the content for `key`, consulting `remote` and judging
    /// cached bytes with `control`.
    ///
    /// Returns `None` when neither the cache nor the remote has the
    /// content.
    ///
    /// # Errors
    ///
    /// Remote failures propagate when the remote is the sole remaining
    /// source; cache-side failures degrade to a miss instead.
    async fn load(
        &self,
        key: &Key,
        remote: &dyn Remote,
        control: &dyn CacheControl,
    ) -> StoreResult<Option<Content>>;
}
