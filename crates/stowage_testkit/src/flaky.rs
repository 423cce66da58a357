//! Fault-injection storage wrapper.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use stowage_core::{Content, Key, Storage, StoreError, StoreResult};

/// Delegating storage that fails a scripted number of operations.
///
/// Each `fail_*` call arms a countdown; the next that many calls of the
/// matching operation fail with an injected I/O error before reaching
/// the inner storage. Used to exercise cache degradation, retry
/// fail-fast, and release-failure paths.
pub struct FlakyStorage {
    inner: Arc<dyn Storage>,
    failing_values: AtomicU32,
    failing_saves: AtomicU32,
    failing_deletes: AtomicU32,
}

impl FlakyStorage {
    /// Wraps `inner` with all fault counters disarmed.
    #[must_use]
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self {
            inner,
            failing_values: AtomicU32::new(0),
            failing_saves: AtomicU32::new(0),
            failing_deletes: AtomicU32::new(0),
        }
    }

    /// Arms the next `count` `value` calls to fail.
    pub fn fail_values(&self, count: u32) {
        self.failing_values.store(count, Ordering::SeqCst);
    }

    /// Arms the next `count` `save` calls to fail.
    pub fn fail_saves(&self, count: u32) {
        self.failing_saves.store(count, Ordering::SeqCst);
    }

    /// Arms the next `count` `delete` calls to fail.
    pub fn fail_deletes(&self, count: u32) {
        self.failing_deletes.store(count, Ordering::SeqCst);
    }

    fn trip(counter: &AtomicU32, operation: &str) -> StoreResult<()> {
        let armed = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok();
        if armed {
            Err(StoreError::Io(std::io::Error::other(format!(
                "injected {operation} failure"
            ))))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn exists(&self, key: &Key) -> StoreResult<bool> {
        self.inner.exists(key).await
    }

    async fn list(&self, prefix: &Key) -> StoreResult<Vec<Key>> {
        self.inner.list(prefix).await
    }

    async fn save(&self, key: &Key, content: Content) -> StoreResult<()> {
        Self::trip(&self.failing_saves, "save")?;
        self.inner.save(key, content).await
    }

    async fn move_value(&self, source: &Key, destination: &Key) -> StoreResult<()> {
        self.inner.move_value(source, destination).await
    }

    async fn size(&self, key: &Key) -> StoreResult<u64> {
        self.inner.size(key).await
    }

    async fn value(&self, key: &Key) -> StoreResult<Content> {
        Self::trip(&self.failing_values, "value")?;
        self.inner.value(key).await
    }

    async fn delete(&self, key: &Key) -> StoreResult<()> {
        Self::trip(&self.failing_deletes, "delete")?;
        self.inner.delete(key).await
    }
}
