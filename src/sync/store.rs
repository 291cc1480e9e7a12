//! Remote snapshot transport.
//!
//! The session pushes whole-document snapshots after each committed
//! mutation; the store is a dumb last-write slot plus a change feed.
//! Everything conflict-related lives in the reconciler, not here.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;

use crate::core::EngineResult;
use crate::state::GameSnapshot;

/// Where committed snapshots go. Implementations must tolerate concurrent
/// pushes from multiple replicas; last write wins at the slot level.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Publish a snapshot. Overwrites whatever was there.
    async fn push_snapshot(&self, snapshot: &GameSnapshot) -> EngineResult<()>;

    /// The most recently pushed snapshot, if any.
    async fn fetch_snapshot(&self) -> EngineResult<Option<GameSnapshot>>;
}

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// In-process store for tests and single-host setups.
///
/// Snapshots round-trip through the wire encoding on every push, so a
/// snapshot that cannot survive serialization fails here rather than in
/// some real backend later.
pub struct MemoryStore {
    latest: Mutex<Option<Vec<u8>>>,
    changes: broadcast::Sender<GameSnapshot>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            latest: Mutex::new(None),
            changes,
        }
    }

    /// Subscribe to the change feed. Each successful push delivers the
    /// decoded snapshot to every subscriber.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GameSnapshot> {
        self.changes.subscribe()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn push_snapshot(&self, snapshot: &GameSnapshot) -> EngineResult<()> {
        let bytes = snapshot.to_bytes()?;
        *self
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(bytes);
        // No subscribers is fine
        let _ = self.changes.send(snapshot.clone());
        Ok(())
    }

    async fn fetch_snapshot(&self) -> EngineResult<Option<GameSnapshot>> {
        let bytes = self
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match bytes {
            Some(bytes) => Ok(Some(GameSnapshot::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }
}
