//! Randomness source for target selection, cooldown jitter and client identity.
//!
//! The worker never touches a global RNG directly. Production code uses
//! [`SystemRandom`]; tests inject [`ScriptedRandom`] to make target choice
//! and cooldown length exact.

use std::collections::VecDeque;
use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed choices.
pub trait RandomSource: Send {
    /// Returns an index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// Returns a value in `range` (half-open). `range` must be non-empty.
    fn in_range(&mut self, range: Range<u64>) -> u64;
}

/// [`RandomSource`] backed by an entropy-seeded [`StdRng`].
#[derive(Debug)]
pub struct SystemRandom {
    rng: StdRng,
}

impl SystemRandom {
    /// Creates a source seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible source from a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn in_range(&mut self, range: Range<u64>) -> u64 {
        self.rng.gen_range(range)
    }
}

/// Deterministic [`RandomSource`] replaying a fixed sequence of raw values.
///
/// Each call consumes one value `v`: `index(len)` yields `v % len` and
/// `in_range(a..b)` yields `a + v % (b - a)`. Once the script is exhausted
/// every call consumes `0`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedRandom {
    values: VecDeque<u64>,
}

impl ScriptedRandom {
    /// Creates a source that replays `values` in order.
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    fn next_raw(&mut self) -> u64 {
        self.values.pop_front().unwrap_or(0)
    }
}

impl RandomSource for ScriptedRandom {
    #[allow(clippy::cast_possible_truncation)]
    fn index(&mut self, len: usize) -> usize {
        (self.next_raw() % len as u64) as usize
    }

    fn in_range(&mut self, range: Range<u64>) -> u64 {
        let span = range.end.saturating_sub(range.start).max(1);
        range.start + self.next_raw() % span
    }
}
