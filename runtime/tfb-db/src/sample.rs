//! Uniform identifier sampling over the `World` key domain.

use rand::Rng;
use rand::rngs::ThreadRng;

use crate::WORLD_ROW_COUNT;

/// Source of `World` identifiers and replacement `randomNumber` values.
pub trait KeySampler {
    /// Next value in `[1, WORLD_ROW_COUNT]`.
    fn next_key(&mut self) -> u16;
}

/// Draws keys from a random generator, the thread-local one by default.
pub struct RandomKeys<R = ThreadRng> {
    rng: R,
}

impl RandomKeys<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomKeys<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomKeys<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> KeySampler for RandomKeys<R> {
    fn next_key(&mut self) -> u16 {
        self.rng.gen_range(1..=WORLD_ROW_COUNT)
    }
}
