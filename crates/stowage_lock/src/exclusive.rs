//! Acquire-run-release composition.

use std::future::Future;

use futures::future::BoxFuture;
use stowage_core::{Key, Storage, StoreResult};

use crate::lock::Lock;
use crate::retry::RetryLock;
use crate::storage_lock::StorageLock;

/// Runs `operation` between `lock.acquire()` and an unconditional
/// `lock.release()`.
///
/// The operation closure is only invoked once acquisition succeeded, and
/// release runs no matter how the operation ends. If release itself
/// fails, its error surfaces - masking the operation's outcome, even a
/// successful one. Callers must treat the whole call as failed if either
/// the operation or the release failed.
///
/// # Errors
///
/// Acquisition errors, the operation's error, or the release error, in
/// that order of precedence (release last).
pub async fn under_lock<L, T, F, Fut>(lock: &L, operation: F) -> StoreResult<T>
where
    L: Lock + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    lock.acquire().await?;
    let outcome = operation().await;
    match lock.release().await {
        Ok(()) => outcome,
        Err(release_err) => Err(release_err),
    }
}

/// Key-scoped critical sections for any [`Storage`].
///
/// Blanket-implemented for every storage, so
/// `storage.exclusively(&key, || ...)` is always available once this
/// trait is in scope. The operation closure captures whatever it needs -
/// typically the same storage reference the lock coordinates through.
pub trait StorageExclusivity: Storage {
    /// Runs `operation` so that no other `exclusively` call for the same
    /// key on the same backing store overlaps it in time.
    ///
    /// Coordination happens through a [`StorageLock`] on this storage,
    /// wrapped in a [`RetryLock`] so transient contention becomes
    /// bounded latency instead of an immediate failure. Exclusivity is
    /// cooperative: callers bypassing `exclusively` are not constrained.
    ///
    /// A caller abandoning the returned future after acquisition risks
    /// leaving its proposal behind; scope acquire/operate/release as one
    /// awaited unit.
    ///
    /// # Errors
    ///
    /// [`StoreError::LockContention`](stowage_core::StoreError) after
    /// retries are exhausted, the operation's own error, or a release
    /// failure (which masks the operation's outcome).
    fn exclusively<'s, T, F, Fut>(
        &'s self,
        key: &Key,
        operation: F,
    ) -> BoxFuture<'s, StoreResult<T>>
    where
        T: Send + 's,
        F: FnOnce() -> Fut + Send + 's,
        Fut: Future<Output = StoreResult<T>> + Send + 's,
    {
        let target = key.clone();
        Box::pin(async move {
            let lock = RetryLock::new(StorageLock::new(self, target));
            under_lock(&lock, operation).await
        })
    }
}

impl<S: Storage + ?Sized> StorageExclusivity for S {}
