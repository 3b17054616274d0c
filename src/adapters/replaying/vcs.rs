//! Replaying adapter for the `VcsExecutor` port.

use std::path::Path;
use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::vcs::{VcsExecutor, VcsOutput};

/// Replays recorded version-control results from a cassette.
pub struct ReplayingVcsExecutor {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingVcsExecutor {
    /// Creates a new replaying executor from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self {
            replayer: Mutex::new(replayer),
        }
    }
}

impl VcsExecutor for ReplayingVcsExecutor {
    fn run(
        &self,
        _args: &[&str],
        _cwd: &Path,
        _env: &[(&str, &str)],
    ) -> Result<VcsOutput, Box<dyn std::error::Error + Send + Sync>> {
        let output = next_output(&self.replayer, "vcs", "run");
        replay_result(&output, "vcs::run")
    }
}
