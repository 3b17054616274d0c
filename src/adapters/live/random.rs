//! Live randomness backed by `rand`.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ports::random::RandomSource;

/// Live random source around a standard RNG.
///
/// Seeded construction gives reproducible schedules across runs.
pub struct LiveRandom {
    rng: Mutex<StdRng>,
}

impl LiveRandom {
    /// Creates a random source seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a random source with a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for LiveRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for LiveRandom {
    fn unit(&self) -> f64 {
        self.rng.lock().expect("rng lock poisoned").random::<f64>()
    }

    fn between(&self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.rng
            .lock()
            .expect("rng lock poisoned")
            .random_range(low..=high)
    }
}
