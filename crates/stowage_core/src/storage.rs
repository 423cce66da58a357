//! Storage contract definition.

use async_trait::async_trait;

use crate::content::Content;
use crate::error::StoreResult;
use crate::key::Key;

/// The uniform contract every stowage backend implements.
///
/// A storage is an asynchronous key/value store with streaming content:
/// operations may suspend pending I/O but never block the calling
/// thread. Implementations must be `Send + Sync` for use across tasks
/// and threads.
///
/// # Invariants
///
/// - The root key never holds a value; `save` and `value` reject it
/// - `save` is atomic with respect to partial content: if the content
///   stream errors mid-transfer, readers observe either the previous
///   value or none at all
/// - `list` returns a duplicate-free sequence ordered lexicographically
///   by canonical string, matching the prefix as a literal string prefix
///   (not segment-aware)
/// - After a completed `save`, a `value` for the same key observes it
///   (read-your-writes per key); no ordering is guaranteed across keys
///
/// # Implementors
///
/// - [`MemoryStorage`](crate::MemoryStorage) - for tests and ephemeral data
/// - [`FileStorage`](crate::FileStorage) - directory-rooted persistence
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns `true` if `key` currently holds a value.
    async fn exists(&self, key: &Key) -> StoreResult<bool>;

    /// Lists the keys whose canonical string starts with `prefix`'s
    /// string, in lexicographic order, without duplicates.
    ///
    /// The root key lists everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is invalid or the backend fails.
    async fn list(&self, prefix: &Key) -> StoreResult<Vec<Key>>;

    /// Stores `content` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RootKeyRejected`](crate::StoreError) for the
    /// root key; content-stream errors abort the save without leaving a
    /// partial value.
    async fn save(&self, key: &Key, content: Content) -> StoreResult<()>;

    /// Moves the value at `source` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError) if `source`
    /// has no value and `RootKeyRejected` if `destination` is the root.
    async fn move_value(&self, source: &Key, destination: &Key) -> StoreResult<()>;

    /// Returns the size in bytes of the value at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError) if absent.
    async fn size(&self, key: &Key) -> StoreResult<u64>;

    /// Returns the value at `key` as streamable content.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError) if absent and
    /// `RootKeyRejected` for the root key.
    async fn value(&self, key: &Key) -> StoreResult<Content>;

    /// Deletes the value at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError) if absent.
    async fn delete(&self, key: &Key) -> StoreResult<()>;
}
