//! The serialized command queue around one game.
//!
//! ## Key Types
//!
//! - [`GameSession`]: owns the game behind a single async mutex. Commands
//!   acquire the lock in admission order, so concurrent callers settle one
//!   at a time against the latest committed state and partial mutations are
//!   never observable.
//!
//! ## Usage
//!
//! ```no_run
//! # use klondike_sync::core::GameConfig;
//! # use klondike_sync::session::GameSession;
//! # async fn demo() {
//! let session = GameSession::new(GameConfig::new("blue02orange")).unwrap();
//! let outcome = session.tap_stock().await;
//! println!("tap settled as {}", outcome.key());
//! session.wait_for_idle().await;
//! # }
//! ```

use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

use crate::cards::Card;
use crate::core::{EngineResult, GameConfig};
use crate::piles::PileRef;
use crate::session::events::{GameEvent, GameEventKind};
use crate::session::pending::{PendingAction, PendingActions};
use crate::state::game::now_ms;
use crate::state::{DrawOutcome, GameSnapshot, GameState, GameStatus, MoveOutcome};
use crate::sync::{Evaluation, ReconcileOutcome, RemoteStore, SyncReconciler};

const EVENT_CHANNEL_CAPACITY: usize = 64;

struct SessionCore {
    state: GameState,
    /// Pre-command boards, newest last. Cheap to keep: piles share
    /// structure under the hood.
    history: Vec<GameState>,
    reconciler: SyncReconciler,
}

/// One game plus its command queue, change feeds, and sync hooks.
pub struct GameSession {
    core: Mutex<SessionCore>,
    pending: Arc<PendingActions>,
    committed: watch::Sender<GameSnapshot>,
    events: broadcast::Sender<GameEvent>,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl GameSession {
    /// Deal a fresh game and wrap it in a session.
    pub fn new(config: GameConfig) -> EngineResult<Self> {
        let state = GameState::new(config)?;
        let (committed, _) = watch::channel(state.snapshot());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            core: Mutex::new(SessionCore {
                state,
                history: Vec::new(),
                reconciler: SyncReconciler::new(),
            }),
            pending: PendingActions::new(),
            committed,
            events,
            remote: None,
        })
    }

    /// Attach a remote store. Committed snapshots are pushed to it
    /// best-effort after every mutation.
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn RemoteStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    // === Observation ===

    /// The latest committed snapshot. Safe to call mid-command; always
    /// reflects a fully settled state.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.committed.borrow().clone()
    }

    /// Watch channel of committed snapshots.
    #[must_use]
    pub fn watch_snapshots(&self) -> watch::Receiver<GameSnapshot> {
        self.committed.subscribe()
    }

    /// Broadcast channel of change events.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Number of commands in flight.
    #[must_use]
    pub fn pending_action_count(&self) -> usize {
        self.pending.count()
    }

    /// The in-flight commands, in admission order.
    #[must_use]
    pub fn pending_actions(&self) -> Vec<PendingAction> {
        self.pending.in_flight()
    }

    /// Block until every admitted command has settled.
    pub async fn wait_for_idle(&self) {
        self.pending.wait_for_idle().await;
    }

    /// Terminal status of the current board.
    pub async fn status(&self) -> GameStatus {
        self.core.lock().await.state.status()
    }

    /// Number of undoable commands.
    pub async fn undo_depth(&self) -> usize {
        self.core.lock().await.history.len()
    }

    /// Would `pile` accept `card` right now? `false` for out-of-range
    /// references.
    pub async fn can_accept_card(&self, pile: PileRef, card: Card) -> bool {
        self.core
            .lock()
            .await
            .state
            .pile(pile)
            .is_some_and(|p| p.can_accept_card(card))
    }

    // === Commands ===

    /// Replace the game with a fresh deal. Clears undo history and any held
    /// remote snapshot; both belong to the dead game.
    pub async fn configure_game(&self, config: GameConfig) -> EngineResult<()> {
        let _guard = self.pending.begin("configure");
        let state = GameState::new(config)?;

        let mut core = self.core.lock().await;
        core.state = state;
        core.history.clear();
        core.reconciler.clear();
        self.publish(&core, GameEventKind::Configured).await;
        Ok(())
    }

    /// Tap the stock: draw, recycle-and-draw, or no-op on an empty board.
    pub async fn tap_stock(&self) -> DrawOutcome {
        let guard = self.pending.begin("draw");
        let outcome = {
            let mut core = self.core.lock().await;
            let before = core.state.clone();
            let outcome = core.state.draw_from_stock();
            if !matches!(outcome, DrawOutcome::Empty) {
                core.history.push(before);
                let kind = match outcome {
                    DrawOutcome::Recycled(_) => GameEventKind::Recycled,
                    _ => GameEventKind::Drawn,
                };
                self.publish(&core, kind).await;
            }
            outcome
        };
        drop(guard);
        self.try_resolve_held().await;
        outcome
    }

    /// Move a run between tableau columns.
    pub async fn move_tableau_to_tableau(
        &self,
        from: usize,
        to: usize,
        count: usize,
    ) -> MoveOutcome {
        self.apply_move(move |state| state.move_tableau_to_tableau(from, to, count))
            .await
    }

    /// Move the waste top onto a tableau column.
    pub async fn move_waste_to_tableau(&self, to: usize) -> MoveOutcome {
        self.apply_move(move |state| state.move_waste_to_tableau(to)).await
    }

    /// Move the waste top onto a foundation.
    pub async fn move_waste_to_foundation(&self, foundation: usize) -> MoveOutcome {
        self.apply_move(move |state| state.move_waste_to_foundation(foundation))
            .await
    }

    /// Move a tableau top card onto a foundation.
    pub async fn move_tableau_to_foundation(&self, from: usize, foundation: usize) -> MoveOutcome {
        self.apply_move(move |state| state.move_tableau_to_foundation(from, foundation))
            .await
    }

    /// Dig a foundation top card back onto a tableau column.
    pub async fn move_foundation_to_tableau(&self, foundation: usize, to: usize) -> MoveOutcome {
        self.apply_move(move |state| state.move_foundation_to_tableau(foundation, to))
            .await
    }

    /// Restore the board from before the last state-changing command.
    /// Returns `false` when there is nothing to undo.
    ///
    /// The restored board commits as a new mutation: revision and timestamp
    /// move forward, so other replicas see the undo as the latest write.
    pub async fn undo(&self) -> bool {
        let guard = self.pending.begin("undo");
        let undone = {
            let mut core = self.core.lock().await;
            match core.history.pop() {
                Some(previous) => {
                    let revision = core.state.revision + 1;
                    core.state = previous;
                    core.state.revision = revision;
                    core.state.updated_at_ms = now_ms();
                    self.publish(&core, GameEventKind::Undone).await;
                    true
                }
                None => false,
            }
        };
        drop(guard);
        self.try_resolve_held().await;
        undone
    }

    /// Restore the session wholesale from a snapshot, bypassing the
    /// reconciler. Used for local persistence, not remote sync.
    pub async fn restore_snapshot(&self, snapshot: &GameSnapshot) -> EngineResult<()> {
        let state = GameState::from_snapshot(snapshot)?;
        let guard = self.pending.begin("restore");
        {
            let mut core = self.core.lock().await;
            core.state = state;
            core.history.clear();
            self.publish(&core, GameEventKind::Configured).await;
        }
        drop(guard);
        self.try_resolve_held().await;
        Ok(())
    }

    /// Remove every card from a tableau column. Test-construction command.
    pub async fn clear_tableau_column(&self, index: usize) -> bool {
        let guard = self.pending.begin("clear");
        let cleared = {
            let mut core = self.core.lock().await;
            let before = core.state.clone();
            match core.state.clear_tableau_column(index) {
                Some(_) => {
                    core.history.push(before);
                    self.publish(&core, GameEventKind::Moved).await;
                    true
                }
                None => false,
            }
        };
        drop(guard);
        self.try_resolve_held().await;
        cleared
    }

    /// Force a card onto a tableau column. Test-construction command.
    pub async fn add_card_to_tableau(&self, index: usize, card: Card) -> bool {
        let guard = self.pending.begin("add");
        let added = {
            let mut core = self.core.lock().await;
            let before = core.state.clone();
            if core.state.add_card_to_tableau(index, card) {
                core.history.push(before);
                self.publish(&core, GameEventKind::Moved).await;
                true
            } else {
                false
            }
        };
        drop(guard);
        self.try_resolve_held().await;
        added
    }

    async fn apply_move(&self, op: impl FnOnce(&mut GameState) -> MoveOutcome) -> MoveOutcome {
        let guard = self.pending.begin("move");
        let outcome = {
            let mut core = self.core.lock().await;
            let before = core.state.clone();
            let outcome = op(&mut core.state);
            if outcome.is_moved() {
                core.history.push(before);
                self.publish(&core, GameEventKind::Moved).await;
            }
            outcome
        };
        drop(guard);
        self.try_resolve_held().await;
        outcome
    }

    // === Sync ===

    /// Offer a snapshot from another replica.
    ///
    /// Adopted only when the session is idle and the snapshot is intact and
    /// at least as new as local state. While commands are in flight the
    /// snapshot is held (newest wins) and re-evaluated at idle, so queued
    /// local intent settles against local state first.
    pub async fn offer_remote(&self, snapshot: GameSnapshot) -> ReconcileOutcome {
        let mut core = self.core.lock().await;
        if self.pending.count() > 0 {
            core.reconciler.hold(snapshot);
            return ReconcileOutcome::Held;
        }
        // Registered after the busy-check: the token makes the adoption
        // visible to pending-count observers without tripping the check.
        let _guard = self.pending.begin("adopt");
        self.adopt_if_eligible(&mut core, snapshot).await
    }

    /// Push the committed snapshot to the remote store after the queue
    /// drains. No-op without a store.
    pub async fn flush_remote(&self) -> EngineResult<()> {
        self.wait_for_idle().await;
        let snapshot = {
            let core = self.core.lock().await;
            core.state.snapshot()
        };
        if let Some(remote) = &self.remote {
            remote.push_snapshot(&snapshot).await?;
        }
        Ok(())
    }

    /// Re-evaluate the held snapshot once the queue drains. Called after
    /// every command settles.
    async fn try_resolve_held(&self) {
        let mut core = self.core.lock().await;
        if self.pending.count() > 0 {
            return;
        }
        if let Some(snapshot) = core.reconciler.take_held() {
            let _guard = self.pending.begin("adopt");
            let outcome = self.adopt_if_eligible(&mut core, snapshot).await;
            debug!(outcome = outcome.key(), "held snapshot resolved");
        }
    }

    async fn adopt_if_eligible(
        &self,
        core: &mut SessionCore,
        snapshot: GameSnapshot,
    ) -> ReconcileOutcome {
        match SyncReconciler::evaluate(core.state.updated_at_ms, &snapshot) {
            Evaluation::Corrupt => ReconcileOutcome::Corrupt,
            Evaluation::Stale => ReconcileOutcome::Stale,
            Evaluation::Adopt => match GameState::from_snapshot(&snapshot) {
                Ok(state) => {
                    info!(
                        revision = snapshot.revision,
                        updated_at_ms = snapshot.updated_at_ms,
                        "adopted remote snapshot"
                    );
                    core.state = state;
                    core.history.clear();
                    self.publish_local(core, GameEventKind::RemoteAdopted);
                    ReconcileOutcome::Adopted
                }
                Err(err) => {
                    warn!(error = %err, "remote snapshot failed to restore");
                    ReconcileOutcome::Corrupt
                }
            },
        }
    }

    /// Publish the committed state and push it to the remote store.
    async fn publish(&self, core: &SessionCore, kind: GameEventKind) {
        self.publish_local(core, kind);
        if let Some(remote) = &self.remote {
            let snapshot = core.state.snapshot();
            if let Err(err) = remote.push_snapshot(&snapshot).await {
                warn!(error = %err, "remote snapshot push failed");
            }
        }
    }

    fn publish_local(&self, core: &SessionCore, kind: GameEventKind) {
        debug!(
            revision = core.state.revision,
            kind = kind.key(),
            "committed"
        );
        self.committed.send_replace(core.state.snapshot());
        // No subscribers is fine
        let _ = self.events.send(GameEvent {
            revision: core.state.revision,
            kind,
        });
    }
}
