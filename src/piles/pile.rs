//! Piles: ordered card sequences with per-kind acceptance rules.
//!
//! All 13 piles of a game share one representation. Index 0 is the bottom
//! (oldest) card; the last index is the top, the only accessible card for
//! single-card operations. Acceptance is the only polymorphic behavior and
//! is dispatched on `PileKind` - stock and waste never accept programmatic
//! placement, they are mutated exclusively by draw/recycle.
//!
//! Cards live in an `im::Vector` so snapshots and undo history clone in
//! O(1).

use im::Vector;
use serde::{Deserialize, Serialize};

use super::rules;
use crate::cards::Card;

/// The four pile kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PileKind {
    /// Face-down draw source.
    Stock,
    /// Face-up cards drawn from stock, most recent on top.
    Waste,
    /// One of the seven cascading columns.
    Tableau,
    /// One of the four ascending per-suit build piles.
    Foundation,
}

/// Reference to one of a game's 13 piles.
///
/// Tableau and foundation indexes are positions on the board; an empty
/// column keeps its index forever.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PileRef {
    Stock,
    Waste,
    Tableau(usize),
    Foundation(usize),
}

impl PileRef {
    /// The kind of pile this reference addresses.
    #[must_use]
    pub const fn kind(self) -> PileKind {
        match self {
            PileRef::Stock => PileKind::Stock,
            PileRef::Waste => PileKind::Waste,
            PileRef::Tableau(_) => PileKind::Tableau,
            PileRef::Foundation(_) => PileKind::Foundation,
        }
    }
}

/// An ordered pile of cards with a kind-specific acceptance rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pile {
    kind: PileKind,
    cards: Vector<Card>,
}

impl Pile {
    /// Create an empty pile of the given kind.
    #[must_use]
    pub fn new(kind: PileKind) -> Self {
        Self {
            kind,
            cards: Vector::new(),
        }
    }

    /// Create a pile from existing cards (bottom first).
    pub fn from_cards(kind: PileKind, cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            kind,
            cards: cards.into_iter().collect(),
        }
    }

    /// The pile's kind.
    #[must_use]
    pub const fn kind(&self) -> PileKind {
        self.kind
    }

    /// Number of cards in the pile.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True if the pile holds no cards. Empty piles stay on the board.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The top (accessible) card.
    #[must_use]
    pub fn top(&self) -> Option<&Card> {
        self.cards.last()
    }

    /// The bottom (oldest) card. For foundations this fixes the suit.
    #[must_use]
    pub fn bottom(&self) -> Option<&Card> {
        self.cards.front()
    }

    /// Card at `index` (0 = bottom).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    /// Iterate bottom to top. Double-ended, so `.rev()` walks top-down.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Card> {
        self.cards.iter()
    }

    /// The cards as a plain `Vec`, bottom first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Card> {
        self.cards.iter().copied().collect()
    }

    /// Push a card on top.
    pub fn push_top(&mut self, card: Card) {
        self.cards.push_back(card);
    }

    /// Remove and return the top card.
    pub fn pop_top(&mut self) -> Option<Card> {
        self.cards.pop_back()
    }

    /// Remove and return the top `n` cards, bottom of the run first.
    ///
    /// Returns `None` (and leaves the pile untouched) if fewer than `n`
    /// cards are present or `n` is zero.
    pub fn take_top(&mut self, n: usize) -> Option<Vec<Card>> {
        if n == 0 || n > self.cards.len() {
            return None;
        }
        let split = self.cards.len() - n;
        let taken = self.cards.split_off(split);
        Some(taken.iter().copied().collect())
    }

    /// Append cards on top, preserving their order (first card lands lowest).
    pub fn extend_top(&mut self, cards: impl IntoIterator<Item = Card>) {
        for card in cards {
            self.cards.push_back(card);
        }
    }

    /// Remove every card, returning them bottom first.
    ///
    /// Deliberately breaks the 52-card invariant unless the cards are placed
    /// elsewhere; used by recycle and by the test-construction surface.
    pub fn drain(&mut self) -> Vec<Card> {
        let cards = self.to_vec();
        self.cards.clear();
        cards
    }

    /// Flip the top card face-up if it is face-down.
    ///
    /// Returns true if a flip happened. Uncovering a face-down tableau card
    /// flips it as part of the move that uncovered it.
    pub fn flip_top_face_up(&mut self) -> bool {
        match self.cards.last() {
            Some(card) if !card.face_up => {
                let flipped = card.with_face_up(true);
                let last = self.cards.len() - 1;
                self.cards.set(last, flipped);
                true
            }
            _ => false,
        }
    }

    /// The top `n` cards as a run candidate (bottom of the run first).
    #[must_use]
    pub fn top_run(&self, n: usize) -> Option<Vec<Card>> {
        if n == 0 || n > self.cards.len() {
            return None;
        }
        Some(self.cards.iter().skip(self.cards.len() - n).copied().collect())
    }

    /// Can this pile accept a single card, under its kind's rule?
    ///
    /// Pure predicate; never mutates.
    #[must_use]
    pub fn can_accept_card(&self, card: Card) -> bool {
        match self.kind {
            // Stock and waste are only mutated by draw/recycle.
            PileKind::Stock | PileKind::Waste => false,
            PileKind::Tableau => rules::tableau_accepts(self.top(), card),
            PileKind::Foundation => rules::foundation_accepts(self.bottom(), self.top(), card),
        }
    }

    /// Can this pile accept a multi-card run (bottom of the run first)?
    ///
    /// Legal only for tableau piles: the run itself must be a valid
    /// face-up descending alternating-color sequence, and the pile must
    /// accept the run's leading card.
    #[must_use]
    pub fn can_accept_run(&self, run: &[Card]) -> bool {
        if !matches!(self.kind, PileKind::Tableau) {
            return false;
        }
        if !rules::is_valid_run(run) {
            return false;
        }
        // run is non-empty after is_valid_run
        self.can_accept_card(run[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    fn pile(kind: PileKind, cards: &[Card]) -> Pile {
        Pile::from_cards(kind, cards.iter().copied())
    }

    #[test]
    fn test_top_bottom_ordering() {
        let p = pile(
            PileKind::Stock,
            &[
                Card::new(Suit::Clubs, Rank::Two),
                Card::new(Suit::Clubs, Rank::Three),
            ],
        );

        assert_eq!(p.bottom().unwrap().rank, Rank::Two);
        assert_eq!(p.top().unwrap().rank, Rank::Three);
    }

    #[test]
    fn test_iter_walks_both_directions() {
        let p = pile(
            PileKind::Tableau,
            &[
                Card::face_up(Suit::Spades, Rank::Nine),
                Card::face_up(Suit::Hearts, Rank::Eight),
                Card::face_up(Suit::Clubs, Rank::Seven),
            ],
        );

        let bottom_up: Vec<Rank> = p.iter().map(|c| c.rank).collect();
        assert_eq!(bottom_up, vec![Rank::Nine, Rank::Eight, Rank::Seven]);

        let top_down: Vec<Rank> = p.iter().rev().map(|c| c.rank).collect();
        assert_eq!(top_down, vec![Rank::Seven, Rank::Eight, Rank::Nine]);
    }

    #[test]
    fn test_take_top_preserves_run_order() {
        let mut p = pile(
            PileKind::Tableau,
            &[
                Card::face_up(Suit::Spades, Rank::Nine),
                Card::face_up(Suit::Hearts, Rank::Eight),
                Card::face_up(Suit::Clubs, Rank::Seven),
            ],
        );

        let run = p.take_top(2).unwrap();
        assert_eq!(run[0].rank, Rank::Eight);
        assert_eq!(run[1].rank, Rank::Seven);
        assert_eq!(p.len(), 1);

        assert!(p.take_top(2).is_none());
        assert_eq!(p.len(), 1);
        assert!(p.take_top(0).is_none());
    }

    #[test]
    fn test_flip_top() {
        let mut p = pile(
            PileKind::Tableau,
            &[Card::new(Suit::Hearts, Rank::Four)],
        );

        assert!(p.flip_top_face_up());
        assert!(p.top().unwrap().face_up);
        assert!(!p.flip_top_face_up());
    }

    #[test]
    fn test_stock_and_waste_never_accept() {
        let king = Card::face_up(Suit::Hearts, Rank::King);
        assert!(!Pile::new(PileKind::Stock).can_accept_card(king));
        assert!(!Pile::new(PileKind::Waste).can_accept_card(king));
    }

    #[test]
    fn test_empty_tableau_accepts_only_kings() {
        let empty = Pile::new(PileKind::Tableau);

        for suit in Suit::ALL {
            assert!(empty.can_accept_card(Card::face_up(suit, Rank::King)));
        }
        for rank in [Rank::Ace, Rank::Queen, Rank::Jack, Rank::Ten, Rank::Five] {
            assert!(!empty.can_accept_card(Card::face_up(Suit::Spades, rank)));
        }
    }

    #[test]
    fn test_tableau_stacking() {
        let p = pile(
            PileKind::Tableau,
            &[Card::face_up(Suit::Spades, Rank::Nine)],
        );

        assert!(p.can_accept_card(Card::face_up(Suit::Hearts, Rank::Eight)));
        assert!(p.can_accept_card(Card::face_up(Suit::Diamonds, Rank::Eight)));
        // Same color
        assert!(!p.can_accept_card(Card::face_up(Suit::Clubs, Rank::Eight)));
        // Wrong rank
        assert!(!p.can_accept_card(Card::face_up(Suit::Hearts, Rank::Seven)));
    }

    #[test]
    fn test_foundation_rules() {
        let empty = Pile::new(PileKind::Foundation);
        assert!(empty.can_accept_card(Card::face_up(Suit::Hearts, Rank::Ace)));
        assert!(!empty.can_accept_card(Card::face_up(Suit::Hearts, Rank::Two)));

        let hearts = pile(
            PileKind::Foundation,
            &[
                Card::face_up(Suit::Hearts, Rank::Ace),
                Card::face_up(Suit::Hearts, Rank::Two),
            ],
        );
        assert!(hearts.can_accept_card(Card::face_up(Suit::Hearts, Rank::Three)));
        // Wrong suit: the first ace fixed the foundation to hearts
        assert!(!hearts.can_accept_card(Card::face_up(Suit::Diamonds, Rank::Three)));
        // Rank gap
        assert!(!hearts.can_accept_card(Card::face_up(Suit::Hearts, Rank::Four)));
    }

    #[test]
    fn test_run_acceptance() {
        let dest = pile(
            PileKind::Tableau,
            &[Card::face_up(Suit::Clubs, Rank::Ten)],
        );

        let good = [
            Card::face_up(Suit::Hearts, Rank::Nine),
            Card::face_up(Suit::Spades, Rank::Eight),
        ];
        assert!(dest.can_accept_run(&good));

        // Not alternating
        let bad = [
            Card::face_up(Suit::Hearts, Rank::Nine),
            Card::face_up(Suit::Diamonds, Rank::Eight),
        ];
        assert!(!dest.can_accept_run(&bad));

        // Face-down card inside the run
        let hidden = [
            Card::face_up(Suit::Hearts, Rank::Nine),
            Card::new(Suit::Spades, Rank::Eight),
        ];
        assert!(!dest.can_accept_run(&hidden));

        // Foundations never take runs
        let foundation = Pile::new(PileKind::Foundation);
        assert!(!foundation.can_accept_run(&[Card::face_up(Suit::Hearts, Rank::Ace)]));
    }
}
