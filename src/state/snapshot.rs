//! Wholesale serialization of a game for persistence and remote sync.
//!
//! A snapshot is self-describing: it carries the configuration, the
//! revision/timestamp pair, and every pile with explicit empties, so a
//! restored game is indistinguishable from the one that produced it.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, FOUNDATION_PILES, TABLEAU_COLUMNS};
use crate::core::{DrawMode, EngineError, EngineResult, GameConfig};
use crate::piles::{Pile, PileKind};
use crate::state::game::GameState;
use crate::state::integrity::IntegrityReport;

/// A complete, portable copy of one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub seed: String,
    pub draw_mode: DrawMode,
    pub opening_draw: bool,
    pub revision: u64,
    pub updated_at_ms: u64,
    pub stock: Vec<Card>,
    pub waste: Vec<Card>,
    /// Always seven entries; empty columns are explicit empty lists.
    pub tableau: Vec<Vec<Card>>,
    /// Always four entries.
    pub foundations: Vec<Vec<Card>>,
}

impl GameSnapshot {
    /// Serialize as JSON.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize with bincode for the sync wire.
    pub fn to_bytes(&self) -> EngineResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Parse from bincode bytes.
    pub fn from_bytes(bytes: &[u8]) -> EngineResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Audit the snapshot and fail if it does not hold exactly the 52
    /// distinct cards. This is the gate remote snapshots pass before
    /// adoption.
    pub fn ensure_integrity(&self) -> EngineResult<()> {
        let report = self.validate_integrity();
        if report.valid {
            Ok(())
        } else {
            Err(EngineError::CorruptSnapshot {
                total: report.total,
                unique: report.unique,
            })
        }
    }

    /// Run the full-deck audit over the snapshot's piles.
    #[must_use]
    pub fn validate_integrity(&self) -> IntegrityReport {
        IntegrityReport::audit(
            self.stock
                .iter()
                .chain(self.waste.iter())
                .chain(self.tableau.iter().flatten())
                .chain(self.foundations.iter().flatten())
                .map(|c| c.identity()),
        )
    }
}

impl GameState {
    /// Capture the current state as a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            seed: self.config.seed.clone(),
            draw_mode: self.config.draw_mode,
            opening_draw: self.config.opening_draw,
            revision: self.revision,
            updated_at_ms: self.updated_at_ms,
            stock: self.stock.to_vec(),
            waste: self.waste.to_vec(),
            tableau: self.tableau.iter().map(Pile::to_vec).collect(),
            foundations: self.foundations.iter().map(Pile::to_vec).collect(),
        }
    }

    /// Restore a game wholesale from a snapshot, revision and timestamp
    /// included.
    ///
    /// Rejects snapshots with the wrong pile counts as malformed. Card-set
    /// integrity is deliberately not enforced here: test scenarios restore
    /// boards mid-construction, and the sync layer audits remote snapshots
    /// before it ever adopts one.
    pub fn from_snapshot(snapshot: &GameSnapshot) -> EngineResult<Self> {
        if snapshot.tableau.len() != TABLEAU_COLUMNS {
            return Err(EngineError::MalformedSnapshot(format!(
                "expected {TABLEAU_COLUMNS} tableau columns, got {}",
                snapshot.tableau.len()
            )));
        }
        if snapshot.foundations.len() != FOUNDATION_PILES {
            return Err(EngineError::MalformedSnapshot(format!(
                "expected {FOUNDATION_PILES} foundation piles, got {}",
                snapshot.foundations.len()
            )));
        }

        let config = GameConfig::new(&snapshot.seed)
            .with_draw_mode(snapshot.draw_mode)
            .with_opening_draw(snapshot.opening_draw);
        config.validate()?;

        let mut tableau_piles = snapshot
            .tableau
            .iter()
            .map(|cards| Pile::from_cards(PileKind::Tableau, cards.iter().copied()));
        let mut foundation_piles = snapshot
            .foundations
            .iter()
            .map(|cards| Pile::from_cards(PileKind::Foundation, cards.iter().copied()));

        Ok(Self {
            config,
            stock: Pile::from_cards(PileKind::Stock, snapshot.stock.iter().copied()),
            waste: Pile::from_cards(PileKind::Waste, snapshot.waste.iter().copied()),
            tableau: std::array::from_fn(|_| {
                tableau_piles.next().unwrap_or_else(|| Pile::new(PileKind::Tableau))
            }),
            foundations: std::array::from_fn(|_| {
                foundation_piles
                    .next()
                    .unwrap_or_else(|| Pile::new(PileKind::Foundation))
            }),
            revision: snapshot.revision,
            updated_at_ms: snapshot.updated_at_ms,
        })
    }
}
