//! Optimistic lock protocol over storage primitives.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use parking_lot::Mutex;
use stowage_core::{Content, Key, Storage, StoreError, StoreResult};
use uuid::Uuid;

use crate::lock::Lock;

/// Private key namespace holding lock proposals.
pub const LOCK_NAMESPACE: &str = ".stowage-locks";

/// A mutual-exclusion lock built from `save`/`list`/`delete` alone.
///
/// For target key `T`, each acquisition attempt writes a marker value
/// (a *proposal*) at `.stowage-locks/T/<attempt-id>` with a freshly
/// generated attempt id, then lists the proposals for `T`. Seeing
/// exactly its own proposal means the lock is taken; anything else is
/// contention: the attempt withdraws its proposal and fails with
/// [`StoreError::LockContention`].
///
/// The detector is conservative, not a queue - simultaneous contenders
/// may repeatedly collide and all back off, with no fairness or
/// progress guarantee under sustained contention. Compose with
/// [`RetryLock`](crate::RetryLock) to absorb transient collisions.
///
/// # Expiration
///
/// A lock built with [`with_expiration`](StorageLock::with_expiration)
/// tags its proposal with a deadline. Competing acquirers treat
/// proposals whose deadline has passed as abandoned: they reap them and
/// exclude them from the contention count, so a crashed holder blocks
/// the key only until its deadline.
pub struct StorageLock<'a, S: Storage + ?Sized> {
    storage: &'a S,
    target: Key,
    ttl: Option<Duration>,
    held: Mutex<Option<Key>>,
}

enum Liveness {
    Live,
    Expired,
    Gone,
}

impl<'a, S: Storage + ?Sized> StorageLock<'a, S> {
    /// Creates a lock for `target`, coordinated through `storage`.
    pub fn new(storage: &'a S, target: Key) -> Self {
        Self {
            storage,
            target,
            ttl: None,
            held: Mutex::new(None),
        }
    }

    /// Creates a lock whose proposals expire `ttl` after acquisition.
    pub fn with_expiration(storage: &'a S, target: Key, ttl: Duration) -> Self {
        Self {
            storage,
            target,
            ttl: Some(ttl),
            held: Mutex::new(None),
        }
    }

    /// The key the lock guards.
    #[must_use]
    pub fn target(&self) -> &Key {
        &self.target
    }

    fn proposals_root(&self) -> Key {
        Key::new([LOCK_NAMESPACE]).join(&self.target)
    }

    fn proposal_value(&self) -> Content {
        match self.ttl {
            None => Content::empty(),
            Some(ttl) => {
                let deadline = now_millis().saturating_add(ttl.as_millis());
                Content::from_bytes(deadline.to_string())
            }
        }
    }

    /// Classifies a competing proposal by reading its deadline tag.
    async fn liveness(&self, proposal: &Key) -> Liveness {
        let content = match self.storage.value(proposal).await {
            Ok(content) => content,
            Err(StoreError::NotFound { .. }) => return Liveness::Gone,
            Err(_) => return Liveness::Live,
        };
        let bytes = match content.read_all().await {
            Ok(bytes) => bytes,
            Err(_) => return Liveness::Live,
        };
        if bytes.is_empty() {
            return Liveness::Live;
        }
        match std::str::from_utf8(&bytes)
            .ok()
            .and_then(|text| text.trim().parse::<u128>().ok())
        {
            Some(deadline) if deadline <= now_millis() => Liveness::Expired,
            _ => Liveness::Live,
        }
    }

    async fn withdraw(&self, proposal: &Key, why: &str) {
        if let Err(err) = self.storage.delete(proposal).await {
            tracing::debug!(proposal = ?proposal, error = %err, "failed to delete proposal ({why})");
        }
    }
}

#[async_trait]
impl<S: Storage + ?Sized> Lock for StorageLock<'_, S> {
    async fn acquire(&self) -> StoreResult<()> {
        let root = self.proposals_root();
        let proposal = root.child(Uuid::new_v4().to_string());
        self.storage.save(&proposal, self.proposal_value()).await?;

        // Listing is a literal string-prefix match, so it can surface
        // proposals of sibling targets whose canonical string shares a
        // prefix; keep only entries directly under our root.
        let depth = root.segments().len() + 1;
        let listed = self.storage.list(&root).await?;
        let mut competitors = 0usize;
        let mut own_seen = false;
        for entry in listed {
            if entry.segments().len() != depth
                || entry.segments()[..depth - 1] != *root.segments()
            {
                continue;
            }
            if entry == proposal {
                own_seen = true;
                continue;
            }
            match self.liveness(&entry).await {
                Liveness::Live => competitors += 1,
                Liveness::Gone => {}
                Liveness::Expired => self.withdraw(&entry, "expired").await,
            }
        }

        if own_seen && competitors == 0 {
            *self.held.lock() = Some(proposal);
            return Ok(());
        }

        self.withdraw(&proposal, "lost the race").await;
        Err(StoreError::contention(&self.target))
    }

    async fn release(&self) -> StoreResult<()> {
        let Some(proposal) = self.held.lock().take() else {
            return Ok(());
        };
        match self.storage.delete(&proposal).await {
            Ok(()) | Err(StoreError::NotFound { .. }) => Ok(()),
            Err(err) => {
                // Keep the handle so a later release can try again.
                *self.held.lock() = Some(proposal);
                Err(err)
            }
        }
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
