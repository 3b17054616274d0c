//! Replaying adapter for the `Clock` port.

use std::sync::Mutex;

use chrono::NaiveDateTime;

use super::next_output;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::clock::Clock;

/// Replays recorded clock values from a cassette.
pub struct ReplayingClock {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingClock {
    /// Creates a new replaying clock from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self {
            replayer: Mutex::new(replayer),
        }
    }
}

impl Clock for ReplayingClock {
    fn now(&self) -> NaiveDateTime {
        let output = next_output(&self.replayer, "clock", "now");
        serde_json::from_value(output).expect("clock::now: failed to deserialize NaiveDateTime")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::test_support::replayer;
    use serde_json::json;

    #[test]
    fn serves_recorded_times_in_order() {
        let clock = ReplayingClock::new(replayer(&[
            ("clock", "now", json!("2024-06-15T10:30:00")),
            ("clock", "now", json!("2024-06-15T10:31:00")),
        ]));

        let t1 = clock.now();
        let t2 = clock.now();
        assert_eq!(t1.to_string(), "2024-06-15 10:30:00");
        assert!(t2 > t1);
    }
}
