//! Replaying adapter for the `RandomSource` port.

use std::sync::Mutex;

use super::next_output;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::random::RandomSource;

/// Replays recorded random draws from a cassette.
pub struct ReplayingRandom {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingRandom {
    /// Creates a new replaying random source from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self {
            replayer: Mutex::new(replayer),
        }
    }
}

impl RandomSource for ReplayingRandom {
    fn unit(&self) -> f64 {
        next_output(&self.replayer, "random", "unit")
            .as_f64()
            .expect("random::unit: expected float output")
    }

    fn between(&self, _low: u32, _high: u32) -> u32 {
        let value = next_output(&self.replayer, "random", "between")
            .as_u64()
            .expect("random::between: expected integer output");
        u32::try_from(value).expect("random::between: value out of range")
    }
}
