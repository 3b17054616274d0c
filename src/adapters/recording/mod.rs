//! Recording adapters that capture interactions to cassettes.

pub mod clock;
pub mod filesystem;
pub mod random;
pub mod vcs;

use std::sync::{Arc, Mutex};

use serde::Serialize;

pub use clock::RecordingClock;
pub use filesystem::RecordingFileSystem;
pub use random::RecordingRandom;
pub use vcs::RecordingVcsExecutor;

use crate::cassette::recorder::CassetteRecorder;

/// Record an interaction with a plain (non-`Result`) return value.
///
/// Mirror of `replaying::next_output`.
pub(crate) fn record_interaction<I, O>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    let input_json = serde_json::to_value(input).expect("failed to serialize recording input");
    let output_json = serde_json::to_value(output).expect("failed to serialize recording output");

    recorder
        .lock()
        .expect("recorder lock poisoned")
        .record(port, method, input_json, output_json);
}

/// Record a `Result<T, E>` interaction as `{"ok": v}` or `{"err": e.to_string()}`.
///
/// Mirror of `replaying::replay_result`.
pub(crate) fn record_result<T, E, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    let output = match result {
        Ok(v) => {
            let value = serde_json::to_value(v).expect("failed to serialize ok value");
            serde_json::json!({ "ok": value })
        }
        Err(e) => serde_json::json!({ "err": e.to_string() }),
    };
    record_interaction(recorder, port, method, input, &output);
}
