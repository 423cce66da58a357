//! Lazy, optionally-sized byte sequences.
//!
//! [`Content`] is the unit of value exchange with a
//! [`Storage`](crate::Storage): a chunk stream with an optional declared
//! size. Two consumption disciplines exist:
//!
//! - *repeatable* content may be opened any number of times, each open
//!   re-running the producer (or re-serving the backing buffer);
//! - *one-time* content permits exactly one successful open; a second
//!   attempt fails with [`StoreError::ConsumedTwice`] instead of silently
//!   yielding no data.
//!
//! Backends generally return one-time content for streamed values to
//! avoid buffering.

mod digest;
mod one_time;

pub use digest::ContentDigest;

use bytes::{Bytes, BytesMut};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::fmt;

use crate::error::{StoreError, StoreResult};
use one_time::OneTime;

/// A fallible stream of byte chunks.
pub type ByteStream = BoxStream<'static, StoreResult<Bytes>>;

type Producer = Box<dyn Fn() -> ByteStream + Send + Sync>;

/// A byte sequence, possibly of unknown total length, produced lazily.
pub struct Content {
    size: Option<u64>,
    body: Body,
}

enum Body {
    Bytes(Bytes),
    Producer(Producer),
    OneTime(OneTime),
}

impl Content {
    /// Repeatable content backed by an in-memory buffer.
    ///
    /// The size is always known.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            size: Some(bytes.len() as u64),
            body: Body::Bytes(bytes),
        }
    }

    /// Empty content of size zero.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// Repeatable content; each [`open`](Content::open) re-runs the
    /// producer.
    pub fn from_producer<F>(size: Option<u64>, producer: F) -> Self
    where
        F: Fn() -> ByteStream + Send + Sync + 'static,
    {
        Self {
            size,
            body: Body::Producer(Box::new(producer)),
        }
    }

    /// One-time content wrapping a single chunk stream.
    ///
    /// The first [`open`](Content::open) hands the stream out; every
    /// later open fails with [`StoreError::ConsumedTwice`].
    #[must_use]
    pub fn one_time(size: Option<u64>, stream: ByteStream) -> Self {
        Self {
            size,
            body: Body::OneTime(OneTime::new(stream)),
        }
    }

    /// The declared size in bytes, if known.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Obtains the chunk stream for one traversal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConsumedTwice`] for one-time content that
    /// was already opened.
    pub fn open(&self) -> StoreResult<ByteStream> {
        match &self.body {
            Body::Bytes(bytes) => {
                let bytes = bytes.clone();
                Ok(stream::once(future::ready(Ok(bytes))).boxed())
            }
            Body::Producer(producer) => Ok(producer()),
            Body::OneTime(guard) => guard.take(),
        }
    }

    /// Drains one traversal into a contiguous buffer.
    ///
    /// Buffers everything in memory; intended for bounded content only.
    /// Non-destructive for repeatable content, single-shot for one-time
    /// content.
    ///
    /// # Errors
    ///
    /// Propagates producer errors and the one-time consumption guard.
    pub async fn read_all(&self) -> StoreResult<Bytes> {
        concat(self.open()?).await
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.body {
            Body::Bytes(_) => "bytes",
            Body::Producer(_) => "producer",
            Body::OneTime(_) => "one-time",
        };
        f.debug_struct("Content")
            .field("size", &self.size)
            .field("kind", &kind)
            .finish()
    }
}

/// Reduces a chunk stream into one contiguous buffer.
///
/// Buffers everything in memory; intended for bounded content only.
///
/// # Errors
///
/// Propagates the first stream error.
pub async fn concat(mut stream: ByteStream) -> StoreResult<Bytes> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.try_next().await? {
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}
