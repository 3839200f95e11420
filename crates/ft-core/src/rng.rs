//! Deterministic per-AGV and world-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each AGV gets its own independent `SmallRng` seeded by:
//!
//!   seed = world_seed XOR (agv_id * MIXING_CONSTANT) XOR (generation * MIXING_CONSTANT²)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive ids uniformly across the seed space.  Folding
//! in the world generation means a reset with the same seed does not replay
//! the previous generation's choices, while two worlds built from the same
//! config still behave identically.

use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::AgvId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Sampling helpers shared by both wrappers.
macro_rules! sampling {
    () => {
        /// Uniform `f64` in `[0, 1)`.
        #[inline]
        pub fn unit(&mut self) -> f64 {
            self.0.r#gen::<f64>()
        }

        #[inline]
        pub fn gen_range<T, R>(&mut self, range: R) -> T
        where
            T: SampleUniform,
            R: SampleRange<T>,
        {
            self.0.gen_range(range)
        }

        /// `None` only for an empty slice.
        #[inline]
        pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
            items.choose(&mut self.0)
        }
    };
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-AGV stream: task choice, destination choice, retry delays.
pub struct AgentRng(SmallRng);

impl AgentRng {
    pub fn new(world_seed: u64, agv: AgvId, generation: u64) -> Self {
        let seed = world_seed
            ^ (agv.0 as u64).wrapping_mul(MIXING_CONSTANT)
            ^ generation.wrapping_mul(MIXING_CONSTANT.wrapping_mul(MIXING_CONSTANT));
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    sampling!();
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// World-level stream for layout, station attributes, spawning and
/// throughput jitter.  Single-threaded.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Split off an independent stream.  `offset` separates siblings drawn
    /// at the same point.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let seed = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(seed))
    }

    sampling!();
}
