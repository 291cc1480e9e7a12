//! # klondike-sync
//!
//! A Klondike solitaire rule engine with a serialized command queue and
//! multi-replica snapshot synchronization.
//!
//! ## Architecture
//!
//! - **cards**: suits, ranks, face state, and seeded deck construction
//! - **core**: configuration, error types, and the deterministic RNG
//! - **piles**: the four pile kinds and their placement rules
//! - **state**: the 13-pile game aggregate, terminal detection, the
//!   full-deck auditor, and wholesale snapshots
//! - **session**: the async command queue, pending-action tracking, and
//!   change events
//! - **sync**: snapshot transport and last-write-wins reconciliation
//! - **hooks**: the automation facade used by end-to-end harnesses
//!
//! ## Design Principles
//!
//! 1. **Determinism**: a seed string fully determines the deal, so any two
//!    replicas configured alike start identical
//! 2. **Validate before mutate**: illegal commands settle as rejections and
//!    leave state untouched; there is no rollback path
//! 3. **Serialized commands**: concurrent callers settle one at a time in
//!    admission order against the latest committed state
//! 4. **Whole-document sync**: replicas exchange complete snapshots and
//!    resolve conflicts last-write-wins, with local pending commands
//!    always settling first

pub mod cards;
pub mod core;
pub mod hooks;
pub mod piles;
pub mod session;
pub mod state;
pub mod sync;

pub use cards::{Card, Color, Rank, Suit};
pub use core::{DrawMode, EngineError, EngineResult, GameConfig};
pub use hooks::TestHooks;
pub use piles::{Pile, PileKind, PileRef};
pub use session::{GameEvent, GameEventKind, GameSession};
pub use state::{
    DrawOutcome, GameSnapshot, GameState, GameStatus, IntegrityReport, MoveOutcome,
};
pub use sync::{MemoryStore, ReconcileOutcome, RemoteStore, SyncReconciler};
