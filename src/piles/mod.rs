//! Pile abstraction and the move validator.
//!
//! ## Key Types
//!
//! - `Pile`: ordered card sequence (index 0 = bottom) with a per-kind
//!   acceptance rule
//! - `PileKind`: stock / waste / tableau / foundation
//! - `PileRef`: addresses one of a game's 13 piles by board position
//! - `rules`: the pure legality predicates

pub mod pile;
pub mod rules;

pub use pile::{Pile, PileKind, PileRef};
