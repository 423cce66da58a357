//! Storage fixtures with automatic cleanup.
//!
//! Provides convenience constructors for backends wired the way tests
//! want them: in-memory for speed, tempdir-backed files for realism.

use std::future::Future;
use std::sync::Arc;

use stowage_core::{FileStorage, MemoryStorage, Storage};
use tempfile::TempDir;

/// A test storage with automatic cleanup.
pub struct TestStorage {
    storage: Arc<dyn Storage>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestStorage {
    /// Creates an in-memory test storage.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            storage: Arc::new(MemoryStorage::new()),
            _temp_dir: None,
        }
    }

    /// Creates a file-backed test storage rooted in a fresh tempdir.
    ///
    /// The directory lives as long as the fixture and is removed with
    /// it.
    pub async fn file() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let storage = FileStorage::open(temp_dir.path())
            .await
            .expect("failed to open file storage");
        Self {
            storage: Arc::new(storage),
            _temp_dir: Some(temp_dir),
        }
    }

    /// A shared handle to the storage.
    #[must_use]
    pub fn storage(&self) -> Arc<dyn Storage> {
        Arc::clone(&self.storage)
    }
}

impl std::ops::Deref for TestStorage {
    type Target = dyn Storage;

    fn deref(&self) -> &Self::Target {
        self.storage.as_ref()
    }
}

/// Runs a test body against a fresh in-memory storage.
pub async fn with_memory_storage<F, Fut, R>(f: F) -> R
where
    F: FnOnce(Arc<dyn Storage>) -> Fut,
    Fut: Future<Output = R>,
{
    f(TestStorage::memory().storage()).await
}

/// Runs a test body against a fresh tempdir-backed file storage.
pub async fn with_file_storage<F, Fut, R>(f: F) -> R
where
    F: FnOnce(Arc<dyn Storage>) -> Fut,
    Fut: Future<Output = R>,
{
    let fixture = TestStorage::file().await;
    f(fixture.storage()).await
}
