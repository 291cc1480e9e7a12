//! Test-automation facade over a session.
//!
//! Mirrors what end-to-end harnesses need: string outcomes, card codes
//! instead of typed cards, count queries, and a JSON debug dump. Everything
//! here reads committed snapshots or dispatches ordinary session commands;
//! no hook can observe a half-applied mutation.

use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::cards::{Card, Rank, Suit};
use crate::core::{EngineResult, GameConfig};
use crate::piles::PileRef;
use crate::session::GameSession;
use crate::state::{GameSnapshot, IntegrityReport};

/// One tableau column as a harness sees it.
#[derive(Clone, Debug, Serialize)]
pub struct TableauColumnState {
    pub index: usize,
    pub card_count: usize,
    pub is_empty: bool,
    /// Code of the top card, e.g. `"KH"`. `None` for an empty column.
    pub top_card: Option<String>,
    pub cards: Vec<String>,
    pub face_up: Vec<bool>,
}

/// Automation surface around one [`GameSession`].
#[derive(Clone)]
pub struct TestHooks {
    session: Arc<GameSession>,
}

impl TestHooks {
    #[must_use]
    pub fn new(session: Arc<GameSession>) -> Self {
        Self { session }
    }

    /// The wrapped session, for mixing hook calls with direct commands.
    #[must_use]
    pub fn session(&self) -> &Arc<GameSession> {
        &self.session
    }

    /// Deal a fresh game from string parameters (`"one"` / `"three"`).
    pub async fn configure_game(&self, seed: &str, draw_mode: &str) -> EngineResult<()> {
        self.session
            .configure_game(GameConfig::from_keys(seed, draw_mode)?)
            .await
    }

    /// Tap the stock; settles as `"draw"`, `"recycle"`, or `"empty"`.
    pub async fn tap_stock(&self) -> &'static str {
        self.session.tap_stock().await.key()
    }

    /// Move a run between tableau columns; `"moved"` or `"rejected"`.
    pub async fn move_tableau_to_tableau(
        &self,
        from: usize,
        to: usize,
        count: usize,
    ) -> &'static str {
        self.session
            .move_tableau_to_tableau(from, to, count)
            .await
            .key()
    }

    pub async fn clear_tableau_column(&self, index: usize) -> bool {
        self.session.clear_tableau_column(index).await
    }

    /// Force a face-up card of the given identity onto a tableau column.
    pub async fn add_card_to_tableau(&self, index: usize, suit: Suit, rank: Rank) -> bool {
        self.session
            .add_card_to_tableau(index, Card::face_up(suit, rank))
            .await
    }

    /// Would `pile` accept a face-up card of the given identity right now?
    pub async fn can_accept_card(&self, pile: PileRef, suit: Suit, rank: Rank) -> bool {
        self.session
            .can_accept_card(pile, Card::face_up(suit, rank))
            .await
    }

    // === Count and snapshot queries ===

    #[must_use]
    pub fn get_stock_count(&self) -> usize {
        self.session.snapshot().stock.len()
    }

    #[must_use]
    pub fn get_waste_count(&self) -> usize {
        self.session.snapshot().waste.len()
    }

    /// Cards across all 13 piles. 52 on an intact board.
    #[must_use]
    pub fn get_total_card_count(&self) -> usize {
        let snapshot = self.session.snapshot();
        snapshot.stock.len()
            + snapshot.waste.len()
            + snapshot.tableau.iter().map(Vec::len).sum::<usize>()
            + snapshot.foundations.iter().map(Vec::len).sum::<usize>()
    }

    /// Stock cards bottom-first, as codes.
    #[must_use]
    pub fn get_stock_snapshot(&self) -> Vec<String> {
        Self::codes(&self.session.snapshot().stock)
    }

    /// Waste cards bottom-first, as codes.
    #[must_use]
    pub fn get_waste_snapshot(&self) -> Vec<String> {
        Self::codes(&self.session.snapshot().waste)
    }

    /// All seven columns, empty ones included.
    #[must_use]
    pub fn get_tableau_state(&self) -> Vec<TableauColumnState> {
        self.session
            .snapshot()
            .tableau
            .iter()
            .enumerate()
            .map(|(index, cards)| TableauColumnState {
                index,
                card_count: cards.len(),
                is_empty: cards.is_empty(),
                top_card: cards.last().map(|c| c.code()),
                cards: Self::codes(cards),
                face_up: cards.iter().map(|c| c.face_up).collect(),
            })
            .collect()
    }

    /// Card counts of the four foundations, in board order.
    #[must_use]
    pub fn get_foundation_counts(&self) -> Vec<usize> {
        self.session
            .snapshot()
            .foundations
            .iter()
            .map(Vec::len)
            .collect()
    }

    /// Top card code of each foundation; `None` for an empty pile.
    #[must_use]
    pub fn get_foundation_tops(&self) -> Vec<Option<String>> {
        self.session
            .snapshot()
            .foundations
            .iter()
            .map(|cards| cards.last().map(|c| c.code()))
            .collect()
    }

    /// Run the full-deck audit over the committed snapshot.
    #[must_use]
    pub fn validate_card_integrity(&self) -> IntegrityReport {
        self.session.snapshot().validate_integrity()
    }

    #[must_use]
    pub fn get_pending_action_count(&self) -> usize {
        self.session.pending_action_count()
    }

    pub async fn wait_for_idle(&self) {
        self.session.wait_for_idle().await;
    }

    /// Opaque diagnostic dump for harness logs.
    pub async fn get_debug_state(&self) -> serde_json::Value {
        let snapshot = self.session.snapshot();
        let pending = self.session.pending_action_count();
        json!({
            "seed": snapshot.seed,
            "draw_mode": snapshot.draw_mode.key(),
            "revision": snapshot.revision,
            "updated_at_ms": snapshot.updated_at_ms,
            "status": self.session.status().await.key(),
            "pending_action_count": pending,
            "has_pending_action": pending > 0,
            "is_locked": pending > 0,
            "undo_depth": self.session.undo_depth().await,
        })
    }

    // === Persistence ===

    /// Serialize the committed state as JSON.
    pub fn to_json(&self) -> EngineResult<String> {
        self.session.snapshot().to_json()
    }

    /// Restore the session from a JSON snapshot.
    pub async fn from_json(&self, json: &str) -> EngineResult<()> {
        let snapshot = GameSnapshot::from_json(json)?;
        self.session.restore_snapshot(&snapshot).await
    }

    fn codes(cards: &[Card]) -> Vec<String> {
        cards.iter().map(|c| c.code()).collect()
    }
}
