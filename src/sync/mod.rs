//! Multi-replica synchronization: snapshot transport and last-write-wins
//! conflict resolution.

pub mod reconciler;
pub mod store;

pub use reconciler::{Evaluation, ReconcileOutcome, SyncReconciler};
pub use store::{MemoryStore, RemoteStore};
