//! Error types for storage operations.

use std::io;
use thiserror::Error;

use crate::key::Key;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred in the backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The key has no value where one was expected.
    #[error("no value at {key:?}")]
    NotFound {
        /// The key that was looked up.
        key: Key,
    },

    /// A value operation was attempted on the root key.
    ///
    /// The root key is a listing prefix; it may never hold a value.
    #[error("the root key cannot hold a value")]
    RootKeyRejected,

    /// A key segment is empty or contains the path separator.
    #[error("invalid key segment: {segment:?}")]
    InvalidKey {
        /// The offending segment.
        segment: String,
    },

    /// One-time content was subscribed to more than once.
    #[error("one-time content was already consumed")]
    ConsumedTwice,

    /// A competing lock proposal was observed during acquisition.
    #[error("lock contention on {key:?}")]
    LockContention {
        /// The key the lock targets.
        key: Key,
    },
}

impl StoreError {
    /// Creates a not-found error for the given key.
    pub fn not_found(key: &Key) -> Self {
        Self::NotFound { key: key.clone() }
    }

    /// Creates an invalid-key error for the given segment.
    pub fn invalid_key(segment: impl Into<String>) -> Self {
        Self::InvalidKey {
            segment: segment.into(),
        }
    }

    /// Creates a lock-contention error for the given target key.
    pub fn contention(key: &Key) -> Self {
        Self::LockContention { key: key.clone() }
    }
}
