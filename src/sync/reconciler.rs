//! Conflict resolution between the local game and snapshots arriving from
//! other replicas.
//!
//! Policy is document-level last-write-wins keyed on `updated_at_ms`.
//! Local pending commands always win over an incoming snapshot: while any
//! command is in flight the snapshot is held, and only the newest held
//! snapshot is re-evaluated once the session drains. A snapshot that fails
//! the full-deck audit is discarded outright; remote data never installs a
//! broken deck.

use tracing::debug;

use crate::state::GameSnapshot;

/// What the reconciler decided about one incoming snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Newer than local state and intact; the session restored it wholesale.
    Adopted,
    /// Commands are in flight; kept aside for re-evaluation at idle.
    Held,
    /// Strictly older than local state; discarded.
    Stale,
    /// Failed the full-deck audit; discarded.
    Corrupt,
}

impl ReconcileOutcome {
    /// Wire key for the outcome.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            ReconcileOutcome::Adopted => "adopted",
            ReconcileOutcome::Held => "held",
            ReconcileOutcome::Stale => "stale",
            ReconcileOutcome::Corrupt => "corrupt",
        }
    }
}

/// Verdict on a snapshot against local state, before any adoption happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Evaluation {
    Adopt,
    Stale,
    Corrupt,
}

/// Holds at most one deferred snapshot per session.
#[derive(Debug, Default)]
pub struct SyncReconciler {
    held: Option<GameSnapshot>,
}

impl SyncReconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Judge a snapshot against the local timestamp.
    ///
    /// Equal timestamps adopt: a replica that produces the same millisecond
    /// is treated as concurrent, and the remote copy wins the tie.
    #[must_use]
    pub fn evaluate(local_updated_at_ms: u64, snapshot: &GameSnapshot) -> Evaluation {
        if let Err(err) = snapshot.ensure_integrity() {
            debug!(error = %err, "discarding corrupt remote snapshot");
            return Evaluation::Corrupt;
        }
        if snapshot.updated_at_ms < local_updated_at_ms {
            debug!(
                remote_ms = snapshot.updated_at_ms,
                local_ms = local_updated_at_ms,
                "discarding stale remote snapshot"
            );
            return Evaluation::Stale;
        }
        Evaluation::Adopt
    }

    /// Defer a snapshot until the session drains. Only the newest survives;
    /// an older arrival never displaces a newer held one.
    pub fn hold(&mut self, snapshot: GameSnapshot) {
        match &self.held {
            Some(held) if held.updated_at_ms > snapshot.updated_at_ms => {
                debug!(
                    held_ms = held.updated_at_ms,
                    offered_ms = snapshot.updated_at_ms,
                    "keeping newer held snapshot"
                );
            }
            _ => self.held = Some(snapshot),
        }
    }

    /// Take the deferred snapshot, if any, leaving the slot empty.
    pub fn take_held(&mut self) -> Option<GameSnapshot> {
        self.held.take()
    }

    /// Is a snapshot waiting for the session to drain?
    #[must_use]
    pub fn has_held(&self) -> bool {
        self.held.is_some()
    }

    /// Drop any deferred snapshot. Used when the session reconfigures and
    /// the held snapshot belongs to a dead game.
    pub fn clear(&mut self) {
        self.held = None;
    }
}
