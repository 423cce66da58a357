//! Lock contract definition.

use async_trait::async_trait;
use stowage_core::StoreResult;

/// An abstract acquire/release pair.
///
/// Implementations decide what acquisition means; callers only rely on
/// `acquire` succeeding at most once at a time per guarded resource, and
/// on `release` being idempotent.
#[async_trait]
pub trait Lock: Send + Sync {
    /// Attempts to take the lock.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockContention`](stowage_core::StoreError)
    /// when a competitor holds or races for the lock, or a backend error.
    async fn acquire(&self) -> StoreResult<()>;

    /// Releases the lock. Idempotent when not held.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the release could not be recorded.
    async fn release(&self) -> StoreResult<()>;
}
