//! Card system: identities, face state, and the deterministic deck.
//!
//! ## Key Types
//!
//! - `Suit`, `Rank`, `Color`: card identity components
//! - `Card`: immutable `(suit, rank)` identity plus a mutable face-up flag
//! - `deck::standard_deck` / `deck::shuffled_deck`: the canonical 52 and the
//!   seed-string-deterministic permutation of it

pub mod card;
pub mod deck;

pub use card::{Card, Color, Rank, Suit};
pub use deck::{all_identities, shuffled_deck, standard_deck};
pub use deck::{DECK_SIZE, FOUNDATION_PILES, TABLEAU_COLUMNS, TABLEAU_DEAL};
