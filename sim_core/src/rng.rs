//! Fork probability source
//!
//! The fork decision is the only randomness in the simulator. It is drawn
//! from an injected [`ForkRng`] so a workload replay with the same seed
//! reproduces the same schedule exactly.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::VecDeque;

/// Source of fork draws in `1..=100`
pub trait ForkRng {
    /// Returns the next draw
    fn next_percent(&mut self) -> u32;
}

/// Seeded ChaCha20-backed fork source
///
/// The same seed yields the same draw sequence on every platform.
pub struct ChaChaForkRng {
    rng: ChaCha20Rng,
}

impl ChaChaForkRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl ForkRng for ChaChaForkRng {
    fn next_percent(&mut self) -> u32 {
        (self.rng.next_u32() % 100) + 1
    }
}

/// Scripted fork source for tests
///
/// Yields the given draws in order, then 100 forever (so an exhausted
/// script stops forking for any probability below 100).
pub struct ScriptedForkRng {
    draws: VecDeque<u32>,
}

impl ScriptedForkRng {
    pub fn new(draws: impl IntoIterator<Item = u32>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl ForkRng for ScriptedForkRng {
    fn next_percent(&mut self) -> u32 {
        self.draws.pop_front().unwrap_or(100)
    }
}
