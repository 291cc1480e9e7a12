//! Move validator: pure predicates over cards and pile tops.
//!
//! These functions decide legality only; they never mutate and never
//! consult anything beyond their arguments. `Pile::can_accept_card` and
//! `Pile::can_accept_run` dispatch into them per pile kind.

use crate::cards::{Card, Rank};

/// Can `incoming` stack on `onto` in a tableau cascade?
///
/// Requires `onto` face-up, `incoming` exactly one rank below, opposite
/// color.
#[must_use]
pub fn stacks_on_tableau(incoming: Card, onto: Card) -> bool {
    onto.face_up && onto.rank.is_one_above(incoming.rank) && onto.color() != incoming.color()
}

/// Tableau acceptance for a single incoming card.
///
/// An empty column accepts only a king, any suit. This is a standalone
/// rule, not a degenerate case of stacking: the column persists at its
/// board index while empty.
#[must_use]
pub fn tableau_accepts(top: Option<&Card>, incoming: Card) -> bool {
    match top {
        None => incoming.rank == Rank::King,
        Some(&onto) => stacks_on_tableau(incoming, onto),
    }
}

/// Foundation acceptance for a single incoming card.
///
/// The suit is assigned lazily by the first ace placed (`bottom`); after
/// that the pile builds strictly ascending in that suit.
#[must_use]
pub fn foundation_accepts(bottom: Option<&Card>, top: Option<&Card>, incoming: Card) -> bool {
    match (bottom, top) {
        (None, _) => incoming.rank == Rank::Ace,
        (Some(bottom), Some(top)) => {
            incoming.suit == bottom.suit && incoming.rank.is_one_above(top.rank)
        }
        // A non-empty pile always has both a bottom and top.
        (Some(_), None) => false,
    }
}

/// Is `cards` (bottom of the run first) a movable tableau run?
///
/// Every card must be face-up and each adjacent pair must descend by
/// exactly one rank with alternating colors.
#[must_use]
pub fn is_valid_run(cards: &[Card]) -> bool {
    if cards.is_empty() {
        return false;
    }
    if cards.iter().any(|c| !c.face_up) {
        return false;
    }
    cards
        .windows(2)
        .all(|pair| stacks_on_tableau(pair[1], pair[0]))
}
