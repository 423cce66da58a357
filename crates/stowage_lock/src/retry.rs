//! Bounded-retry decorator for locks.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use stowage_core::{StoreError, StoreResult};

use crate::lock::Lock;

/// Default number of acquisition attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(100);

/// Wraps any [`Lock`] with bounded exponential-backoff retries.
///
/// Only [`StoreError::LockContention`] is retried - contention is
/// transient by nature, while a backend I/O failure underneath the lock
/// is treated as fatal and fails fast. After exhausting the attempt
/// budget, the last contention error surfaces to the caller.
///
/// Each retried `acquire` delegates to a fresh call on the inner lock;
/// with [`StorageLock`](crate::StorageLock) that means a fresh attempt
/// id per try. Backoff delays are scheduled with [`tokio::time::sleep`],
/// never a blocking sleep.
pub struct RetryLock<L> {
    inner: L,
    max_attempts: u32,
    initial_delay: Duration,
}

impl<L: Lock> RetryLock<L> {
    /// Wraps `inner` with the default schedule (3 attempts, 100 ms
    /// initial delay, doubling).
    pub fn new(inner: L) -> Self {
        Self::with_schedule(inner, DEFAULT_MAX_ATTEMPTS, DEFAULT_INITIAL_DELAY)
    }

    /// Wraps `inner` with an explicit attempt budget and initial delay.
    ///
    /// An attempt budget of zero still performs one attempt.
    pub fn with_schedule(inner: L, max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    /// Consumes the decorator, returning the wrapped lock.
    pub fn into_inner(self) -> L {
        self.inner
    }

    async fn with_retries<'a, F, Fut>(&'a self, mut operation: F) -> StoreResult<()>
    where
        F: FnMut(&'a L) -> Fut,
        Fut: Future<Output = StoreResult<()>> + 'a,
    {
        let mut delay = self.initial_delay;
        let mut attempt = 1;
        loop {
            match operation(&self.inner).await {
                Ok(()) => return Ok(()),
                Err(err @ StoreError::LockContention { .. }) => {
                    if attempt >= self.max_attempts {
                        return Err(err);
                    }
                    tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "lock contended, backing off");
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl<L: Lock> Lock for RetryLock<L> {
    async fn acquire(&self) -> StoreResult<()> {
        self.with_retries(|lock| lock.acquire()).await
    }

    async fn release(&self) -> StoreResult<()> {
        self.with_retries(|lock| lock.release()).await
    }
}
