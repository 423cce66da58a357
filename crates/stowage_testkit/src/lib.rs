//! # Stowage Testkit
//!
//! Test utilities for stowage.
//!
//! This crate provides:
//! - Storage fixtures with automatic cleanup
//! - Property-based test generators using proptest
//! - Fault-injection storage for exercising degradation paths
//! - Cross-crate integration tests (under `tests/`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stowage_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn test_with_storage() {
//!     let fixture = TestStorage::memory();
//!     let storage = fixture.storage();
//!     // ... test operations
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod flaky;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::flaky::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use flaky::*;
pub use generators::*;
