//! Session layer: the serialized command queue, pending-action tracking,
//! and change events.

pub mod events;
pub mod pending;
#[allow(clippy::module_inception)]
pub mod session;

pub use events::{GameEvent, GameEventKind};
pub use pending::{PendingAction, PendingActions, PendingGuard};
pub use session::GameSession;
