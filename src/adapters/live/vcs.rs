//! Live version-control executor that shells out to the `git` CLI.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::ports::vcs::{VcsExecutor, VcsOutput};

/// Default per-command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to wait for the pipes to close once the child is gone.
///
/// A grandchild (an ssh transport, a credential helper) can inherit the
/// pipes and hold them open after git itself has exited or been killed.
const PIPE_GRACE: Duration = Duration::from_millis(200);

/// Live executor running `git` as a blocking child process.
///
/// A command that outlives the timeout is killed and reported as a failed
/// outcome; it is never retried.
pub struct LiveGitExecutor {
    program: String,
    timeout: Duration,
}

impl LiveGitExecutor {
    /// Creates an executor for `git` with the given timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "git".to_string(),
            timeout,
        }
    }

    /// Creates an executor for an arbitrary program (used by tests).
    #[must_use]
    pub fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl Default for LiveGitExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

/// Reads a pipe to EOF on a detached thread.
///
/// The thread is never joined, so a pipe held open by a grandchild cannot
/// block the caller past [`collect`]'s deadline.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Waits for a drained pipe until `deadline`, giving up with an empty string.
fn collect(output: &Receiver<String>, deadline: Instant) -> String {
    let remaining = deadline.saturating_duration_since(Instant::now());
    output.recv_timeout(remaining).unwrap_or_default()
}

impl VcsExecutor for LiveGitExecutor {
    fn run(
        &self,
        args: &[&str],
        cwd: &Path,
        env: &[(&str, &str)],
    ) -> Result<VcsOutput, Box<dyn std::error::Error + Send + Sync>> {
        debug!(program = %self.program, ?args, cwd = %cwd.display(), "running vcs command");

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .envs(env.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to start `{}`: {e}", self.program))?;

        // Pipes are drained on their own threads so a chatty child cannot
        // block on a full pipe while we poll for exit.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break Some(status);
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                break None;
            }
            thread::sleep(POLL_INTERVAL);
        };

        let Some(status) = status else {
            warn!(?args, timeout = ?self.timeout, "vcs command timed out");
            return Ok(VcsOutput::failed(format!(
                "`{} {}` timed out after {:?}",
                self.program,
                args.join(" "),
                self.timeout
            )));
        };

        let pipes_closed_by = deadline.max(Instant::now()) + PIPE_GRACE;
        let stdout = collect(&stdout, pipes_closed_by);
        let stderr = collect(&stderr, pipes_closed_by);

        if status.success() {
            Ok(VcsOutput::ok(stdout.trim()))
        } else {
            let detail = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            Ok(VcsOutput::failed(detail))
        }
    }
}
