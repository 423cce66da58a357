//! File-based storage backend for persistent storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use crate::content::{ByteStream, Content};
use crate::error::{StoreError, StoreResult};
use crate::key::Key;
use crate::storage::Storage;

/// Directory reserved for in-flight writes; never surfaced by `list`.
const TMP_DIR: &str = ".stowage-tmp";

/// Chunk size for streamed reads.
const READ_CHUNK: usize = 64 * 1024;

/// A file-based storage backend.
///
/// Key segments map to path components under a root directory; the value
/// at `a/b/c` lives in the file `<root>/a/b/c`. Data survives process
/// restarts.
///
/// # Atomicity
///
/// `save` streams into a uniquely named file under a reserved temp
/// directory and renames it into place only after the whole stream (and
/// an fsync) succeeded, so readers never observe a partial value.
///
/// # Key mapping
///
/// Segments named `.` or `..` are rejected with `InvalidKey`: they do
/// not map to a distinct path component.
///
/// # Example
///
/// ```no_run
/// use stowage_core::{Content, FileStorage, Key, Storage};
///
/// # async fn example() -> stowage_core::StoreResult<()> {
/// let storage = FileStorage::open("/var/lib/app/blobs").await?;
/// storage.save(&Key::from("logs/today"), Content::from_bytes("...")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Opens a storage rooted at `root`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolves a key to its path under the root, validating segments.
    fn resolve(&self, key: &Key) -> StoreResult<PathBuf> {
        key.string()?;
        let mut path = self.root.clone();
        for segment in key.segments() {
            if segment == "." || segment == ".." {
                return Err(StoreError::invalid_key(segment.clone()));
            }
            path.push(segment);
        }
        Ok(path)
    }

    async fn metadata_of(&self, key: &Key) -> StoreResult<std::fs::Metadata> {
        let path = self.resolve(key)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(meta),
            Ok(_) => Err(StoreError::not_found(key)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::not_found(key))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Streams `content` into a fresh temp file, returning its path.
    async fn spool(&self, content: &Content) -> StoreResult<PathBuf> {
        let tmp_dir = self.root.join(TMP_DIR);
        fs::create_dir_all(&tmp_dir).await?;
        let tmp = tmp_dir.join(Uuid::new_v4().to_string());

        let mut stream = content.open()?;
        let mut file = fs::File::create(&tmp).await?;
        let written: StoreResult<()> = async {
            while let Some(chunk) = stream.try_next().await? {
                file.write_all(&chunk).await?;
            }
            file.sync_all().await?;
            Ok(())
        }
        .await;

        match written {
            Ok(()) => Ok(tmp),
            Err(err) => {
                if let Err(cleanup) = fs::remove_file(&tmp).await {
                    tracing::warn!(path = %tmp.display(), error = %cleanup, "failed to remove abandoned temp file");
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn exists(&self, key: &Key) -> StoreResult<bool> {
        match self.metadata_of(key).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn list(&self, prefix: &Key) -> StoreResult<Vec<Key>> {
        let wanted = prefix.string()?;
        let mut found = Vec::new();
        let mut pending = vec![(self.root.clone(), Key::ROOT)];

        while let Some((dir, base)) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                if base.is_root() && name == TMP_DIR {
                    continue;
                }
                let key = base.child(name);
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push((entry.path(), key));
                } else if file_type.is_file() && key.string()?.starts_with(&wanted) {
                    found.push(key);
                }
            }
        }

        found.sort();
        Ok(found)
    }

    async fn save(&self, key: &Key, content: Content) -> StoreResult<()> {
        if key.is_root() {
            return Err(StoreError::RootKeyRejected);
        }
        let destination = self.resolve(key)?;
        let tmp = self.spool(&content).await?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(&tmp, &destination).await?;
        Ok(())
    }

    async fn move_value(&self, source: &Key, destination: &Key) -> StoreResult<()> {
        if destination.is_root() {
            return Err(StoreError::RootKeyRejected);
        }
        self.metadata_of(source).await?;
        let from = self.resolve(source)?;
        let to = self.resolve(destination)?;
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(&from, &to).await?;
        Ok(())
    }

    async fn size(&self, key: &Key) -> StoreResult<u64> {
        Ok(self.metadata_of(key).await?.len())
    }

    async fn value(&self, key: &Key) -> StoreResult<Content> {
        if key.is_root() {
            return Err(StoreError::RootKeyRejected);
        }
        let length = self.metadata_of(key).await?.len();
        let path = self.resolve(key)?;
        let file = fs::File::open(&path)
            .await
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => StoreError::not_found(key),
                _ => err.into(),
            })?;

        let chunks: ByteStream = stream::try_unfold(file, |mut file| async move {
            let mut buffer = vec![0u8; READ_CHUNK];
            let read = file.read(&mut buffer).await?;
            if read == 0 {
                Ok(None)
            } else {
                buffer.truncate(read);
                Ok(Some((Bytes::from(buffer), file)))
            }
        })
        .boxed();

        Ok(Content::one_time(Some(length), chunks))
    }

    async fn delete(&self, key: &Key) -> StoreResult<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::not_found(key))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn open_storage(dir: &tempfile::TempDir) -> FileStorage {
        FileStorage::open(dir.path()).await.unwrap()
    }

    #[tokio::test]
    async fn save_and_value_roundtrips() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;
        let key = Key::from("nested/path/value");

        storage
            .save(&key, Content::from_bytes("persistent"))
            .await
            .unwrap();

        let value = storage.value(&key).await.unwrap();
        assert_eq!(value.size(), Some(10));
        assert_eq!(value.read_all().await.unwrap().as_ref(), b"persistent");
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        let key = Key::from("durable");

        {
            let storage = open_storage(&dir).await;
            storage
                .save(&key, Content::from_bytes("still here"))
                .await
                .unwrap();
        }

        let storage = open_storage(&dir).await;
        let value = storage.value(&key).await.unwrap();
        assert_eq!(value.read_all().await.unwrap().as_ref(), b"still here");
    }

    #[tokio::test]
    async fn value_streams_in_chunks() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;
        let key = Key::from("large");
        let payload = vec![7u8; READ_CHUNK * 2 + 17];

        storage
            .save(&key, Content::from_bytes(payload.clone()))
            .await
            .unwrap();

        assert_eq!(storage.size(&key).await.unwrap(), payload.len() as u64);
        let drained = storage.value(&key).await.unwrap().read_all().await.unwrap();
        assert_eq!(drained.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn file_value_is_one_time() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;
        let key = Key::from("once");
        storage.save(&key, Content::from_bytes("x")).await.unwrap();

        let value = storage.value(&key).await.unwrap();
        value.read_all().await.unwrap();
        assert!(matches!(
            value.read_all().await,
            Err(StoreError::ConsumedTwice)
        ));
    }

    #[tokio::test]
    async fn failed_stream_leaves_no_trace() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;
        let key = Key::from("atomic");

        let failing = Content::one_time(
            None,
            stream::iter(vec![
                Ok(Bytes::from_static(b"partial")),
                Err(StoreError::Io(std::io::Error::other("interrupted"))),
            ])
            .boxed(),
        );
        assert!(storage.save(&key, failing).await.is_err());

        assert!(!storage.exists(&key).await.unwrap());
        assert!(storage.list(&Key::ROOT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_skips_temp_dir_and_orders() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;
        for path in ["a/b/2", "a/b/c/1", "a/z", "z", "1"] {
            storage
                .save(&Key::from(path), Content::empty())
                .await
                .unwrap();
        }

        let listed = storage.list(&Key::from("a/b")).await.unwrap();
        assert_eq!(listed, vec![Key::from("a/b/2"), Key::from("a/b/c/1")]);

        let all = storage.list(&Key::ROOT).await.unwrap();
        let strings: Vec<String> = all.iter().map(|k| k.string().unwrap()).collect();
        assert_eq!(strings, ["1", "a/b/2", "a/b/c/1", "a/z", "z"]);
    }

    #[tokio::test]
    async fn root_save_and_value_rejected() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;

        assert!(matches!(
            storage.save(&Key::ROOT, Content::empty()).await,
            Err(StoreError::RootKeyRejected)
        ));
        assert!(matches!(
            storage.value(&Key::ROOT).await,
            Err(StoreError::RootKeyRejected)
        ));
    }

    #[tokio::test]
    async fn dot_segments_are_rejected() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;
        let key = Key::new(["..", "escape"]);

        assert!(matches!(
            storage.save(&key, Content::empty()).await,
            Err(StoreError::InvalidKey { .. })
        ));
    }

    #[tokio::test]
    async fn move_and_delete() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;
        let from = Key::from("from/here");
        let to = Key::from("to/there");

        storage.save(&from, Content::from_bytes("m")).await.unwrap();
        storage.move_value(&from, &to).await.unwrap();
        assert!(!storage.exists(&from).await.unwrap());
        assert!(storage.exists(&to).await.unwrap());

        storage.delete(&to).await.unwrap();
        assert!(matches!(
            storage.delete(&to).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
