//! Error types for engine operations.
//!
//! Illegal moves are not errors: they settle as rejected outcomes and leave
//! state untouched. Errors cover configuration failures and snapshot
//! decode/adoption failures, which must fail fast without installing
//! partial state.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while configuring, serializing, or syncing a game.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Seed string is empty or whitespace-only.
    #[error("invalid seed: {0:?}")]
    InvalidSeed(String),

    /// Draw-mode key is not `one` or `three`.
    #[error("unknown draw mode: {0:?}")]
    UnknownDrawMode(String),

    /// Snapshot document has the wrong shape (pile counts, indexes).
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Snapshot failed the full-deck integrity audit after decoding.
    #[error("corrupt snapshot: {total} cards, {unique} unique (expected 52/52)")]
    CorruptSnapshot { total: usize, unique: usize },

    /// JSON snapshot encode/decode error.
    #[error("snapshot serialization error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Byte-level snapshot encode/decode error.
    #[error("snapshot encoding error: {0}")]
    Encode(#[from] bincode::Error),
}
