//! Hierarchical value identifiers.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{StoreError, StoreResult};

/// Identifies a value in a [`Storage`](crate::Storage).
///
/// A key is an ordered, immutable sequence of string segments. The
/// canonical string form joins segments with `/`; the empty sequence is
/// the distinguished [`Key::ROOT`], whose string form is empty.
///
/// Keys are cheap value objects: build them freely, compare them by
/// segment sequence, iterate them in canonical-string order.
///
/// # Validation
///
/// Validation is deferred to string-materialization time: [`Key::string`]
/// fails with [`StoreError::InvalidKey`] for an empty segment or a
/// segment containing `/`, but constructing such a key does not.
/// Intermediate composite keys may therefore be assembled before being
/// checked.
///
/// # Example
///
/// ```rust
/// use stowage_core::Key;
///
/// let key = Key::from("alpha/beta").child("gamma");
/// assert_eq!(key.string().unwrap(), "alpha/beta/gamma");
/// assert_eq!(key.parent(), Some(Key::from("alpha/beta")));
/// assert_eq!(Key::ROOT.parent(), None);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    /// The root key: the empty segment sequence.
    ///
    /// The root never holds a value; it only serves as the all-keys
    /// listing prefix.
    pub const ROOT: Key = Key {
        segments: Vec::new(),
    };

    /// Creates a key from a sequence of segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a new key with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Key {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Key { segments }
    }

    /// Returns a new key with all of `other`'s segments appended.
    #[must_use]
    pub fn join(&self, other: &Key) -> Key {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Key { segments }
    }

    /// Returns the key minus its last segment, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Key> {
        let (_, rest) = self.segments.split_last()?;
        Some(Key {
            segments: rest.to_vec(),
        })
    }

    /// Returns `true` if this is the root key.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the segment sequence.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Materializes the canonical string form, validating every segment.
    ///
    /// The root key materializes to the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if any segment is empty or
    /// contains `/`.
    pub fn string(&self) -> StoreResult<String> {
        for segment in &self.segments {
            if segment.is_empty() || segment.contains('/') {
                return Err(StoreError::invalid_key(segment.clone()));
            }
        }
        Ok(self.segments.join("/"))
    }

    /// Bytes of the canonical form, without requiring validity.
    fn canonical_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.segments.iter().enumerate().flat_map(|(i, segment)| {
            let separator: &[u8] = if i == 0 { b"" } else { b"/" };
            separator.iter().copied().chain(segment.bytes())
        })
    }
}

impl From<&str> for Key {
    /// Splits on `/`, discarding empty splits, so `""` and `"/"` both
    /// yield the root key.
    fn from(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl From<String> for Key {
    fn from(path: String) -> Self {
        Self::from(path.as_str())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:?})", self.segments.join("/"))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    /// Lexicographic over the canonical string, with the raw segment
    /// sequence as a tie-breaker so the order stays total for keys that
    /// only differ in segment boundaries.
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_bytes()
            .cmp(other.canonical_bytes())
            .then_with(|| self.segments.cmp(&other.segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn root_is_empty_string() {
        assert_eq!(Key::ROOT.string().unwrap(), "");
        assert!(Key::ROOT.is_root());
    }

    #[test]
    fn root_has_no_parent() {
        assert_eq!(Key::ROOT.parent(), None);
    }

    #[test]
    fn string_joins_segments() {
        let key = Key::new(["a", "b", "c"]);
        assert_eq!(key.string().unwrap(), "a/b/c");
    }

    #[test]
    fn parent_drops_last_segment() {
        let key = Key::new(["a", "b", "c"]);
        assert_eq!(key.parent(), Some(Key::new(["a", "b"])));
        assert_eq!(Key::new(["a"]).parent(), Some(Key::ROOT));
    }

    #[test]
    fn child_appends() {
        assert_eq!(Key::ROOT.child("a").child("b"), Key::new(["a", "b"]));
    }

    #[test]
    fn join_concatenates() {
        let left = Key::new(["a", "b"]);
        let right = Key::new(["c", "d"]);
        assert_eq!(left.join(&right), Key::new(["a", "b", "c", "d"]));
    }

    #[test]
    fn empty_segment_fails_on_string() {
        let key = Key::new([""]);
        assert!(matches!(
            key.string(),
            Err(StoreError::InvalidKey { .. })
        ));
    }

    #[test]
    fn separator_in_segment_fails_on_string() {
        let key = Key::new(["a/b"]);
        assert!(matches!(
            key.string(),
            Err(StoreError::InvalidKey { .. })
        ));
    }

    #[test]
    fn invalid_key_can_still_be_composed() {
        // Validation is deferred; building is always allowed.
        let key = Key::new(["a/b"]).child("c");
        assert_eq!(key.segments().len(), 2);
        assert!(key.string().is_err());
    }

    #[test]
    fn from_str_splits_on_separator() {
        assert_eq!(Key::from("a/b/c"), Key::new(["a", "b", "c"]));
        assert_eq!(Key::from(""), Key::ROOT);
        assert_eq!(Key::from("/a//b/"), Key::new(["a", "b"]));
    }

    #[test]
    fn equality_by_segments() {
        assert_eq!(Key::new(["a", "b"]), Key::from("a/b"));
        assert_ne!(Key::new(["a", "b"]), Key::new(["a"]));
    }

    #[test]
    fn ordering_is_by_canonical_string() {
        let mut keys = vec![
            Key::from("a/z"),
            Key::from("a/b/c/1"),
            Key::from("z"),
            Key::from("a/b/2"),
            Key::from("1"),
        ];
        keys.sort();
        let strings: Vec<String> = keys.iter().map(|k| k.string().unwrap()).collect();
        assert_eq!(strings, ["1", "a/b/2", "a/b/c/1", "a/z", "z"]);
    }

    proptest! {
        #[test]
        fn valid_keys_roundtrip_through_string(
            segments in prop::collection::vec("[a-zA-Z0-9._-]{1,8}", 1..5)
        ) {
            let key = Key::new(segments.clone());
            let string = key.string().unwrap();
            prop_assert_eq!(Key::from(string.as_str()), key);
            prop_assert_eq!(string, segments.join("/"));
        }

        #[test]
        fn parent_matches_all_but_last(
            segments in prop::collection::vec("[a-z]{1,6}", 1..5)
        ) {
            let key = Key::new(segments.clone());
            let parent = key.parent().unwrap();
            prop_assert_eq!(parent.segments(), &segments[..segments.len() - 1]);
        }
    }
}
