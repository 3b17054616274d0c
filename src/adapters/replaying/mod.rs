//! Replaying adapters that serve recorded interactions.
//!
//! Cassette outputs for fallible calls use `{"ok": value}` /
//! `{"err": "message"}`; infallible calls store the bare value.

pub mod clock;
pub mod filesystem;
pub mod random;
pub mod vcs;

use std::sync::Mutex;

pub use clock::ReplayingClock;
pub use filesystem::ReplayingFileSystem;
pub use random::ReplayingRandom;
pub use vcs::ReplayingVcsExecutor;

use crate::cassette::replayer::CassetteReplayer;

/// Pops the next recorded output for `port::method`.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let mut replayer = replayer.lock().expect("replayer lock poisoned");
    replayer.next_interaction(port, method).output.clone()
}

/// Decodes a recorded `{"ok": ..}` / `{"err": ..}` output.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: &serde_json::Value,
    context: &str,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(err) = output.get("err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = output.get("ok").unwrap_or(output);
    serde_json::from_value(value.clone())
        .map_err(|e| format!("{context}: failed to deserialize: {e}").into())
}
