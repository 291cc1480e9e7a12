//! Full-deck integrity auditing.
//!
//! The auditor is the single source of truth for the 52-card invariant:
//! tests call it between operations, and the sync reconciler runs it against
//! every decoded remote snapshot before adoption. It never mutates anything
//! and is callable at any time.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::{all_identities, Rank, Suit, DECK_SIZE};

/// Result of a full-deck audit.
///
/// `valid` requires `total == 52` and `unique == 52`: every canonical
/// identity present exactly once across all piles combined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// True iff the card set is exactly the canonical 52.
    pub valid: bool,
    /// Total cards counted across all piles.
    pub total: usize,
    /// Distinct identities counted.
    pub unique: usize,
    /// Identities appearing more than once, sorted.
    pub duplicates: Vec<(Suit, Rank)>,
    /// Canonical identities absent from every pile, sorted.
    pub missing: Vec<(Suit, Rank)>,
    /// Identities outside the canonical set.
    ///
    /// The typed `Suit`/`Rank` enums make this unreachable from in-process
    /// state; unknown identities in a remote document are rejected at decode
    /// time instead. The field stays part of the report shape.
    pub extra: Vec<(Suit, Rank)>,
}

impl IntegrityReport {
    /// Audit an arbitrary sequence of card identities.
    pub fn audit(identities: impl IntoIterator<Item = (Suit, Rank)>) -> Self {
        let mut counts: FxHashMap<(Suit, Rank), usize> = FxHashMap::default();
        let mut total = 0usize;

        for identity in identities {
            *counts.entry(identity).or_insert(0) += 1;
            total += 1;
        }

        let unique = counts.len();

        let mut duplicates: Vec<_> = counts
            .iter()
            .filter(|(_, &count)| count > 1)
            .map(|(&identity, _)| identity)
            .collect();
        duplicates.sort_unstable();

        let mut missing: Vec<_> = all_identities()
            .filter(|identity| !counts.contains_key(identity))
            .collect();
        missing.sort_unstable();

        let valid = total == DECK_SIZE && unique == DECK_SIZE;

        Self {
            valid,
            total,
            unique,
            duplicates,
            missing,
            extra: Vec::new(),
        }
    }
}
