//! In-memory storage backend for testing.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::content::Content;
use crate::error::{StoreError, StoreResult};
use crate::key::Key;
use crate::storage::Storage;

/// An in-memory storage backend.
///
/// Values live in a sorted map keyed by canonical key strings, so
/// listings come out ordered for free. Suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// Also serves as the coordination backend for storage-mediated locks in
/// single-process tests.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across tasks.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryStorage {
    /// Creates a new empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn exists(&self, key: &Key) -> StoreResult<bool> {
        let path = key.string()?;
        Ok(self.data.read().contains_key(&path))
    }

    async fn list(&self, prefix: &Key) -> StoreResult<Vec<Key>> {
        let wanted = prefix.string()?;
        let data = self.data.read();
        Ok(data
            .keys()
            .filter(|path| path.starts_with(&wanted))
            .map(|path| Key::from(path.as_str()))
            .collect())
    }

    async fn save(&self, key: &Key, content: Content) -> StoreResult<()> {
        if key.is_root() {
            return Err(StoreError::RootKeyRejected);
        }
        let path = key.string()?;
        // Drain the stream fully before touching the map so a mid-stream
        // error leaves the previous value intact.
        let bytes = content.read_all().await?;
        self.data.write().insert(path, bytes);
        Ok(())
    }

    async fn move_value(&self, source: &Key, destination: &Key) -> StoreResult<()> {
        if destination.is_root() {
            return Err(StoreError::RootKeyRejected);
        }
        let from = source.string()?;
        let to = destination.string()?;
        let mut data = self.data.write();
        match data.remove(&from) {
            Some(bytes) => {
                data.insert(to, bytes);
                Ok(())
            }
            None => Err(StoreError::not_found(source)),
        }
    }

    async fn size(&self, key: &Key) -> StoreResult<u64> {
        let path = key.string()?;
        self.data
            .read()
            .get(&path)
            .map(|bytes| bytes.len() as u64)
            .ok_or_else(|| StoreError::not_found(key))
    }

    async fn value(&self, key: &Key) -> StoreResult<Content> {
        if key.is_root() {
            return Err(StoreError::RootKeyRejected);
        }
        let path = key.string()?;
        self.data
            .read()
            .get(&path)
            .map(|bytes| Content::from_bytes(bytes.clone()))
            .ok_or_else(|| StoreError::not_found(key))
    }

    async fn delete(&self, key: &Key) -> StoreResult<()> {
        let path = key.string()?;
        match self.data.write().remove(&path) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(key)),
        }
    }
}
