//! Recording adapter for the `RandomSource` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_interaction;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::RandomSource;

/// Records random draws while delegating to an inner implementation.
pub struct RecordingRandom {
    inner: Box<dyn RandomSource>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingRandom {
    /// Creates a new recording random source wrapping the given implementation.
    pub fn new(inner: Box<dyn RandomSource>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct RangeInput {
    low: u32,
    high: u32,
}

impl RandomSource for RecordingRandom {
    fn unit(&self) -> f64 {
        let result = self.inner.unit();
        record_interaction(&self.recorder, "random", "unit", &(), &result);
        result
    }

    fn between(&self, low: u32, high: u32) -> u32 {
        let result = self.inner.between(low, high);
        let input = RangeInput { low, high };
        record_interaction(&self.recorder, "random", "between", &input, &result);
        result
    }
}
