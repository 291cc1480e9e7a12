//! Core types: configuration, errors, deterministic RNG.

pub mod config;
pub mod error;
pub mod rng;

pub use config::{DrawMode, GameConfig};
pub use error::{EngineError, EngineResult};
pub use rng::{fnv1a_64, DeckRng};
