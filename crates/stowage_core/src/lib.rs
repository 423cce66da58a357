//! # Stowage Core
//!
//! Backend-agnostic asynchronous blob storage.
//!
//! This crate provides the foundation of stowage:
//! - [`Key`] - hierarchical, validated value identifiers
//! - [`Content`] - lazy, optionally-sized byte sequences with repeatable
//!   and one-time consumption disciplines
//! - [`Storage`] - the contract every backend implements
//! - [`MemoryStorage`] and [`FileStorage`] - reference backends
//!
//! ## Design Principles
//!
//! - Backends are opaque blob stores addressed by keys; they do not
//!   interpret the bytes they hold
//! - All operations are asynchronous and never block the calling thread
//! - Values are streamed, never required to fit in memory
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Example
//!
//! ```rust
//! use stowage_core::{Content, Key, MemoryStorage, Storage};
//!
//! # async fn example() -> stowage_core::StoreResult<()> {
//! let storage = MemoryStorage::new();
//! let key = Key::from("greetings/hello");
//! storage.save(&key, Content::from_bytes("hello world")).await?;
//! let value = storage.value(&key).await?;
//! assert_eq!(value.read_all().await?.as_ref(), b"hello world");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod content;
mod error;
mod file;
mod key;
mod memory;
mod storage;

pub use content::{ByteStream, Content, ContentDigest};
pub use error::{StoreError, StoreResult};
pub use file::FileStorage;
pub use key::Key;
pub use memory::MemoryStorage;
pub use storage::Storage;
