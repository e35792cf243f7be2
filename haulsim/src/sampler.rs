use std::time::Duration;

use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use crate::{minutes, whole_minutes, DEFAULT_SEED, MAX_MINING_TIME, MIN_MINING_TIME};

/// A source of mining durations.
///
/// The controller draws one duration per mining leg; injecting the source at
/// construction keeps the stream out of global state, so tests can replay a
/// fixed sequence with [`FixedDurations`] or pin a seed with
/// [`UniformDurations`].
pub trait MiningDurations {
    /// Returns the duration of the next mining operation.
    fn next_duration(&mut self) -> Duration;
}

/// Mining durations drawn uniformly from the closed range
/// [[`MIN_MINING_TIME`], [`MAX_MINING_TIME`]] at whole-minute granularity.
///
/// Two samplers created with the same seed produce bit-identical streams.
pub struct UniformDurations {
    rng: ChaChaRng,
    range: Uniform<u64>,
}

impl UniformDurations {
    /// Creates a sampler seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaChaRng::seed_from_u64(seed),
            range: Uniform::new_inclusive(
                whole_minutes(MIN_MINING_TIME),
                whole_minutes(MAX_MINING_TIME),
            ),
        }
    }
}

impl Default for UniformDurations {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl MiningDurations for UniformDurations {
    fn next_duration(&mut self) -> Duration {
        minutes(self.range.sample(&mut self.rng))
    }
}

/// Replays a fixed cycle of durations. Meant for tests that need an exact
/// event timeline.
pub struct FixedDurations {
    cycle: Vec<Duration>,
    next: usize,
}

impl FixedDurations {
    /// Creates a sampler cycling through `cycle`.
    ///
    /// # Panics
    ///
    /// Panics if `cycle` is empty.
    #[must_use]
    pub fn new(cycle: Vec<Duration>) -> Self {
        assert!(!cycle.is_empty(), "duration cycle must not be empty");
        Self { cycle, next: 0 }
    }
}

impl MiningDurations for FixedDurations {
    fn next_duration(&mut self) -> Duration {
        let duration = self.cycle[self.next];
        self.next = (self.next + 1) % self.cycle.len();
        duration
    }
}
