//! Game state: the pile aggregate, terminal detection, the full-deck
//! auditor, and wholesale snapshots.

pub mod game;
pub mod integrity;
pub mod snapshot;

pub use game::{DrawOutcome, DrawnHand, GameState, GameStatus, MoveOutcome};
pub use integrity::IntegrityReport;
pub use snapshot::GameSnapshot;
