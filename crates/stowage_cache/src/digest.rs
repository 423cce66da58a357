//! Digest-based cache validation.

use async_trait::async_trait;
use sha2::Sha256;
use stowage_core::{ContentDigest, Key, StoreError, StoreResult};

use crate::control::CacheControl;
use crate::remote::Remote;

/// Validates content by comparing its SHA-256 digest to an expected one.
///
/// The digest is computed by streaming the bytes obtained through the
/// accessor the strategy hands to [`validate`](CacheControl::validate);
/// with [`FromStorageCache`](crate::FromStorageCache) that accessor
/// reads the cached value, so the check detects cache corruption or
/// truncation without touching the remote. Absent content is never
/// valid.
pub struct DigestVerification {
    expected: Vec<u8>,
}

impl DigestVerification {
    /// Expects the given raw SHA-256 digest bytes.
    #[must_use]
    pub fn new(expected: impl Into<Vec<u8>>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    /// Expects the digest given in hex form.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when `hex_digest` is not valid hex.
    pub fn from_hex(hex_digest: &str) -> StoreResult<Self> {
        let expected = hex::decode(hex_digest).map_err(|err| {
            StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("malformed hex digest: {err}"),
            ))
        })?;
        Ok(Self { expected })
    }
}

#[async_trait]
impl CacheControl for DigestVerification {
    async fn validate(&self, _key: &Key, content: &dyn Remote) -> StoreResult<bool> {
        let Some(content) = content.fetch().await? else {
            return Ok(false);
        };
        let digest = ContentDigest::<Sha256>::of(content.open()?).await?;
        Ok(digest == self.expected)
    }
}
