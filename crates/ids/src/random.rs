use rand::Rng;
use std::ops::RangeInclusive;

/// Source of uniformly distributed integers for identifier suffixes.
pub trait RandomSource: Send + Sync {
    /// Draws an integer from `range` (both ends inclusive).
    fn draw(&self, range: RangeInclusive<u32>) -> u32;
}

/// Draws from the thread-local generator of the `rand` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn draw(&self, range: RangeInclusive<u32>) -> u32 {
        rand::thread_rng().gen_range(range)
    }
}

/// Always returns the same value, clamped into the requested range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedRandom(pub u32);

impl RandomSource for FixedRandom {
    fn draw(&self, range: RangeInclusive<u32>) -> u32 {
        self.0.clamp(*range.start(), *range.end())
    }
}
