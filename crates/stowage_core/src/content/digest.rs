//! Streaming content digests.

use futures::stream::TryStreamExt;
use sha2::Digest;

use super::ByteStream;
use crate::error::StoreResult;

/// Streams chunks through an incremental hash function.
///
/// Produces a final digest without materializing the whole content.
///
/// # Example
///
/// ```rust
/// use sha2::Sha256;
/// use stowage_core::ContentDigest;
///
/// let mut digest = ContentDigest::<Sha256>::new();
/// digest.update(b"ca");
/// digest.update(b"fe");
/// let hex = digest.finish_hex();
/// assert_eq!(hex.len(), 64);
/// ```
pub struct ContentDigest<D: Digest> {
    hasher: D,
}

impl<D: Digest> ContentDigest<D> {
    /// Creates a fresh digest.
    #[must_use]
    pub fn new() -> Self {
        Self { hasher: D::new() }
    }

    /// Feeds one chunk into the hash.
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
    }

    /// Finalizes and returns the raw digest bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.hasher.finalize().to_vec()
    }

    /// Finalizes and returns the lowercase hex digest.
    #[must_use]
    pub fn finish_hex(self) -> String {
        hex::encode(self.finish())
    }

    /// Drains a chunk stream through the hash, returning the raw digest.
    ///
    /// # Errors
    ///
    /// Propagates the first stream error.
    pub async fn of(mut stream: ByteStream) -> StoreResult<Vec<u8>> {
        let mut digest = Self::new();
        while let Some(chunk) = stream.try_next().await? {
            digest.update(&chunk);
        }
        Ok(digest.finish())
    }
}

impl<D: Digest> Default for ContentDigest<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use sha2::Sha256;

    #[tokio::test]
    async fn matches_direct_hash() {
        let payload = [0xCA, 0xFE, 0xBA, 0xBE];
        let content = Content::from_bytes(payload.to_vec());

        let streamed = ContentDigest::<Sha256>::of(content.open().unwrap())
            .await
            .unwrap();
        let direct = Sha256::digest(payload).to_vec();

        assert_eq!(streamed, direct);
    }

    #[tokio::test]
    async fn chunking_does_not_change_the_digest() {
        let whole = Content::from_bytes(b"one two three".to_vec());
        let expected = ContentDigest::<Sha256>::of(whole.open().unwrap())
            .await
            .unwrap();

        let mut digest = ContentDigest::<Sha256>::new();
        digest.update(b"one ");
        digest.update(b"two ");
        digest.update(b"three");
        assert_eq!(digest.finish(), expected);
    }

    #[test]
    fn hex_form_is_lowercase_sha256_width() {
        let mut digest = ContentDigest::<Sha256>::new();
        digest.update(b"abc");
        let hex = digest.finish_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex, hex.to_lowercase());
    }
}
