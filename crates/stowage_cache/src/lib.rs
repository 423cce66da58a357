//! # Stowage Cache
//!
//! Read-through/write-through content caching over any
//! [`Storage`](stowage_core::Storage).
//!
//! This crate provides:
//! - [`Remote`] - the caller-supplied async source of truth
//! - [`Cache`] - the load contract
//! - [`CacheControl`] - pluggable validity policies, including
//!   [`Standard`] constants, the [`All`] composer, and
//!   [`DigestVerification`]
//! - [`FromStorageCache`] - cache-preferred strategy
//! - [`FromRemoteCache`] - remote-preferred strategy
//!
//! ## Degradation
//!
//! Cache strategies never fail a load because the cache itself misbehaved:
//! cache-read and validation errors are logged and degrade to a miss, and
//! only remote failures (when the remote is the sole remaining source)
//! reach the caller.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod control;
mod digest;
mod from_remote;
mod from_storage;
mod remote;

pub use cache::Cache;
pub use control::{All, CacheControl, Standard};
pub use digest::DigestVerification;
pub use from_remote::FromRemoteCache;
pub use from_storage::FromStorageCache;
pub use remote::Remote;
