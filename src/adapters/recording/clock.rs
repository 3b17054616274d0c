//! Recording adapter for the `Clock` port.

use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;

use super::record_interaction;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::Clock;

/// Records clock interactions while delegating to an inner implementation.
pub struct RecordingClock {
    inner: Box<dyn Clock>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingClock {
    /// Creates a new recording clock wrapping the given implementation.
    pub fn new(inner: Box<dyn Clock>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl Clock for RecordingClock {
    fn now(&self) -> NaiveDateTime {
        let result = self.inner.now();
        record_interaction(&self.recorder, "clock", "now", &(), &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::ReplayingClock;
    use crate::cassette::config::CassetteConfig;
    use chrono::NaiveDate;

    struct FixedClock(NaiveDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    #[test]
    fn recorded_clock_replays_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clock.cassette.yaml");
        let fixed = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 5, 9)
            .unwrap();

        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&path, "test", "abc")));
        {
            let clock = RecordingClock::new(Box::new(FixedClock(fixed)), Arc::clone(&recorder));
            assert_eq!(clock.now(), fixed);
        }
        Arc::try_unwrap(recorder)
            .unwrap()
            .into_inner()
            .unwrap()
            .finish()
            .unwrap();

        let replay = ReplayingClock::new(CassetteConfig::load_cassette(&path).unwrap());
        assert_eq!(replay.now(), fixed);
    }
}
