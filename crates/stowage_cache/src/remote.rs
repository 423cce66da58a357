//! The remote source of truth.

use futures::future::BoxFuture;
use stowage_core::{Content, StoreResult};

/// A zero-argument asynchronous supplier of optional [`Content`].
///
/// `Ok(None)` means "does not exist upstream" and is never treated as an
/// error by the cache strategies; `Err` means the source is unavailable.
///
/// Blanket-implemented for closures, so a remote is typically written
/// in-place:
///
/// ```rust
/// use futures::FutureExt;
/// use stowage_core::Content;
/// use stowage_cache::Remote;
///
/// let remote = || async { Ok(Some(Content::from_bytes("fresh"))) }.boxed();
/// # fn takes_remote(_: &dyn Remote) {}
/// # takes_remote(&remote);
/// ```
pub trait Remote: Send + Sync {
    /// Fetches the upstream content, if any.
    fn fetch(&self) -> BoxFuture<'_, StoreResult<Option<Content>>>;
}

impl<F> Remote for F
where
    F: Fn() -> BoxFuture<'static, StoreResult<Option<Content>>> + Send + Sync,
{
    fn fetch(&self) -> BoxFuture<'_, StoreResult<Option<Content>>> {
        (self)()
    }
}
