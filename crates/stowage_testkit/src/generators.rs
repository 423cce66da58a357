//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use proptest::prelude::*;
use stowage_core::Key;

/// Strategy for generating valid key segments.
///
/// Segments stay within a conservative character set that every backend
/// can map, and never collide with reserved dot-directories.
pub fn segment_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_-][a-zA-Z0-9._-]{0,11}")
        .expect("invalid regex")
}

/// Strategy for generating valid keys of 1 to 4 segments.
pub fn key_strategy() -> impl Strategy<Value = Key> {
    prop::collection::vec(segment_strategy(), 1..5).prop_map(Key::new)
}

/// Strategy for generating value payloads (arbitrary bytes).
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..1024)
}
