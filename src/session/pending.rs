//! Tracking of in-flight commands.
//!
//! Every command registers itself before touching game state and
//! deregisters on every exit path via the guard's `Drop`. The count is what
//! the reconciler consults to decide whether a remote snapshot may be
//! adopted immediately, and what `wait_for_idle` blocks on.

use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

use crate::state::game::now_ms;

/// One in-flight command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingAction {
    pub id: u64,
    /// Command key, e.g. `"draw"` or `"move"`.
    pub kind: &'static str,
    pub started_at_ms: u64,
}

/// Registry of in-flight commands.
#[derive(Debug)]
pub struct PendingActions {
    next_id: AtomicU64,
    actions: Mutex<FxHashMap<u64, PendingAction>>,
    idle: Notify,
}

impl PendingActions {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            actions: Mutex::new(FxHashMap::default()),
            idle: Notify::new(),
        })
    }

    /// Register a command. The returned guard deregisters it when dropped,
    /// whether the command completed, was rejected, or panicked.
    #[must_use]
    pub fn begin(self: &Arc<Self>, kind: &'static str) -> PendingGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let action = PendingAction {
            id,
            kind,
            started_at_ms: now_ms(),
        };
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, action);
        PendingGuard {
            registry: Arc::clone(self),
            id,
        }
    }

    /// Number of commands currently in flight.
    #[must_use]
    pub fn count(&self) -> usize {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// A copy of every in-flight command, ordered by admission.
    #[must_use]
    pub fn in_flight(&self) -> Vec<PendingAction> {
        let mut actions: Vec<PendingAction> = self
            .actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        actions.sort_by_key(|a| a.id);
        actions
    }

    /// Wait until no commands are in flight. Returns immediately when the
    /// registry is already empty.
    pub async fn wait_for_idle(&self) {
        loop {
            // Register before checking, so a finish between the check and
            // the await cannot be missed.
            let notified = self.idle.notified();
            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn finish(&self, id: u64) {
        let mut actions = self.actions.lock().unwrap_or_else(PoisonError::into_inner);
        actions.remove(&id);
        if actions.is_empty() {
            self.idle.notify_waiters();
        }
    }
}

/// RAII handle for one registered command.
#[derive(Debug)]
pub struct PendingGuard {
    registry: Arc<PendingActions>,
    id: u64,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.registry.finish(self.id);
    }
}
