//! Deterministic random number generation seeded from strings.
//!
//! ## Key Features
//!
//! - **Deterministic**: the same seed string produces the identical sequence
//!   across runs and across processes - no wall clock, no ambient entropy
//! - **String seeds**: game seeds arrive as opaque strings from the UI or the
//!   remote document; a stable FNV-1a hash reduces them to generator state
//!
//! ChaCha8 keeps shuffles fast while remaining statistically solid.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Stable 64-bit FNV-1a hash of a byte string.
///
/// Must never change: persisted games replay their deal from the seed.
#[must_use]
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Deterministic RNG for deck shuffling.
#[derive(Clone, Debug)]
pub struct DeckRng {
    inner: ChaCha8Rng,
}

impl DeckRng {
    /// Create an RNG from a seed string.
    #[must_use]
    pub fn from_seed(seed: &str) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(fnv1a_64(seed.as_bytes())),
        }
    }

    /// Create an RNG from a raw numeric seed.
    #[must_use]
    pub fn from_u64(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Fisher-Yates shuffle of a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }
}
