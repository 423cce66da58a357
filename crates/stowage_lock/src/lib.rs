//! # Stowage Lock
//!
//! Distributed mutual exclusion built from ordinary storage operations.
//!
//! This crate provides:
//! - [`Lock`] - the acquire/release contract
//! - [`StorageLock`] - an optimistic proposal protocol using only
//!   `save`/`list`/`delete` against any [`Storage`](stowage_core::Storage)
//! - [`RetryLock`] - bounded retries with exponential backoff
//! - [`under_lock`] and [`StorageExclusivity::exclusively`] - run an
//!   operation with acquire-before and release-on-any-outcome
//!
//! ## Advisory locking
//!
//! The lock is cooperative: it only constrains callers that go through
//! it. Callers bypassing [`StorageExclusivity::exclusively`] are not
//! excluded, and nothing here prevents them from touching the guarded
//! keys directly.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod exclusive;
mod lock;
mod retry;
mod storage_lock;

pub use exclusive::{under_lock, StorageExclusivity};
pub use lock::Lock;
pub use retry::RetryLock;
pub use storage_lock::{StorageLock, LOCK_NAMESPACE};
