//! Single-consumption guard for chunk streams.

use parking_lot::Mutex;

use super::ByteStream;
use crate::error::{StoreError, StoreResult};

/// Permits exactly one successful subscription to a stream.
///
/// The guard state is the slot itself: taking the stream empties it, and
/// a later take observes the empty slot and fails with
/// [`StoreError::ConsumedTwice`] rather than re-running the underlying
/// producer or returning truncated data.
pub(super) struct OneTime {
    slot: Mutex<Option<ByteStream>>,
}

impl OneTime {
    pub(super) fn new(stream: ByteStream) -> Self {
        Self {
            slot: Mutex::new(Some(stream)),
        }
    }

    pub(super) fn take(&self) -> StoreResult<ByteStream> {
        self.slot.lock().take().ok_or(StoreError::ConsumedTwice)
    }
}
