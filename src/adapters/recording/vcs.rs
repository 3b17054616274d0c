//! Recording adapter for the `VcsExecutor` port.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{VcsExecutor, VcsOutput};

/// Records version-control calls while delegating to an inner implementation.
pub struct RecordingVcsExecutor {
    inner: Box<dyn VcsExecutor>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingVcsExecutor {
    /// Creates a new recording executor wrapping the given implementation.
    pub fn new(inner: Box<dyn VcsExecutor>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct RunInput<'a> {
    args: &'a [&'a str],
    cwd: String,
    env: Vec<String>,
}

impl VcsExecutor for RecordingVcsExecutor {
    fn run(
        &self,
        args: &[&str],
        cwd: &Path,
        env: &[(&str, &str)],
    ) -> Result<VcsOutput, Box<dyn std::error::Error + Send + Sync>> {
        let result = self.inner.run(args, cwd, env);
        let input = RunInput {
            args,
            cwd: cwd.display().to_string(),
            env: env.iter().map(|(k, v)| format!("{k}={v}")).collect(),
        };
        record_result(&self.recorder, "vcs", "run", &input, &result);
        result
    }
}
