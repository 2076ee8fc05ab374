//! Deterministic simulation-level RNG.
//!
//! The engine itself is fully deterministic; randomness only enters through
//! scenario setup (start-position jitter) and randomized tests.  Every draw
//! comes from a `SimRng` seeded from `SimConfig::seed`, so the same seed
//! always reproduces the same run.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::Vec2;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seeded `SmallRng` wrapper.
///
/// Used only in single-threaded contexts.  Derive independent streams with
/// [`SimRng::child`] instead of sharing one across threads.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset, e.g. one stream
    /// per scenario phase.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform offset inside the square `[-r, r]²`.  Returns `Vec2::ZERO` for
    /// a non-positive `r`.
    pub fn jitter(&mut self, r: f64) -> Vec2 {
        if r <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(self.0.gen_range(-r..=r), self.0.gen_range(-r..=r))
    }
}
