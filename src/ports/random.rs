//! Randomness port for schedule generation.

/// Source of random draws used by the grid generators.
///
/// Only two primitive draws are needed: a unit-interval float for
/// Bernoulli trials and a bounded integer for counts and coordinates.
pub trait RandomSource: Send + Sync {
    /// Returns a float uniformly drawn from `[0, 1)`.
    fn unit(&self) -> f64;

    /// Returns an integer uniformly drawn from `[low, high]`.
    ///
    /// Implementations must return `low` when `high <= low`.
    fn between(&self, low: u32, high: u32) -> u32;
}
