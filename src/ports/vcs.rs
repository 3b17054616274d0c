//! Version-control executor port.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Outcome of one version-control invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsOutput {
    /// Whether the command exited successfully within its timeout.
    pub success: bool,
    /// Trimmed stdout on success. On failure, trimmed stderr, or stdout when
    /// stderr is empty.
    pub output: String,
}

impl VcsOutput {
    /// Builds a successful output.
    #[must_use]
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    /// Builds a failed output.
    #[must_use]
    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// Executes version-control commands against a working tree.
///
/// `args` excludes the program name (`["commit", "-m", "..."]`). `env`
/// entries are layered over the inherited environment for this call only.
pub trait VcsExecutor: Send + Sync {
    /// Runs one command and reports whether it succeeded.
    ///
    /// A command that runs but fails (non-zero exit, timeout) is an
    /// `Ok` with `success == false`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the command cannot be started at all,
    /// e.g. the `git` binary is missing.
    fn run(
        &self,
        args: &[&str],
        cwd: &Path,
        env: &[(&str, &str)],
    ) -> Result<VcsOutput, Box<dyn std::error::Error + Send + Sync>>;
}
