//! The commit scheduler.
//!
//! Requests are realized strictly in order, one at a time. Each one is
//! logged, then staged and committed with its backdated timestamp. A
//! failure affects only its own request; the batch carries on.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::grid::CommitRequest;
use crate::log::{CommitLog, CommitLogEntry};
use crate::ports::{FileSystem, VcsExecutor};
use crate::vcs::Vcs;

/// When to push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PushPolicy {
    /// Never push.
    #[default]
    None,
    /// Push after every successful commit.
    AfterEach,
    /// Push once after the batch, if anything was committed.
    AfterAll,
}

/// Where a request ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    /// Not yet attempted.
    Pending,
    /// Written to the log; commit not yet attempted.
    Logged,
    /// Committed locally; push not yet decided.
    Committed,
    /// Committed and pushed.
    Pushed,
    /// Committed; the push that should have carried it failed.
    PushFailed,
    /// Committed; no push was attempted.
    NotPushed,
    /// The log write failed, so no commit was attempted.
    LogFailed,
    /// Staging or committing failed.
    CommitFailed,
}

impl RequestState {
    /// `true` once the commit exists locally.
    #[must_use]
    pub fn is_committed(self) -> bool {
        matches!(
            self,
            Self::Committed | Self::Pushed | Self::PushFailed | Self::NotPushed
        )
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::Logged => "LOGGED",
            Self::Committed => "COMMITTED",
            Self::Pushed => "PUSHED",
            Self::PushFailed => "PUSH_FAILED",
            Self::NotPushed => "NOT_PUSHED",
            Self::LogFailed => "LOG_FAILED",
            Self::CommitFailed => "COMMIT_FAILED",
        };
        f.write_str(name)
    }
}

/// The fate of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    /// The request as it was given.
    pub request: CommitRequest,
    /// Final state.
    pub state: RequestState,
    /// Git or filesystem output explaining the state, if any.
    pub detail: Option<String>,
}

/// Result of the single end-of-batch push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// No push was attempted.
    Skipped,
    /// The push succeeded.
    Pushed,
    /// The push failed with this output.
    Failed(String),
}

/// Everything that happened during [`Scheduler::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Requests that ended committed.
    pub success_count: usize,
    /// One outcome per request, in request order. Requests not reached
    /// before a cancellation are absent.
    pub outcomes: Vec<RequestOutcome>,
    /// Outcome of the `AfterAll` push.
    pub push: PushOutcome,
    /// `true` when the batch stopped early on cancellation.
    pub cancelled: bool,
}

/// Drives requests through the log and git.
pub struct Scheduler<'a> {
    log: CommitLog<'a>,
    vcs: Vcs<'a>,
    stage_path: PathBuf,
    remote: String,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> Scheduler<'a> {
    /// Creates a scheduler committing `stage_path` (relative to the
    /// repository) after each log append to `log_path`.
    #[must_use]
    pub fn new(
        fs: &'a dyn FileSystem,
        exec: &'a dyn VcsExecutor,
        repo: &Path,
        log_path: &Path,
        stage_path: &Path,
    ) -> Self {
        Self {
            log: CommitLog::new(fs, log_path),
            vcs: Vcs::new(exec, repo),
            stage_path: stage_path.to_path_buf(),
            remote: "origin".to_string(),
            cancel: None,
        }
    }

    /// Remote checked before pushing.
    #[must_use]
    pub fn with_remote(mut self, remote: &str) -> Self {
        self.remote = remote.to_string();
        self
    }

    /// Flag polled between requests; once set, no further request starts.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Realizes `requests` in order under `policy`.
    #[must_use]
    pub fn execute(&self, requests: &[CommitRequest], policy: PushPolicy) -> ExecutionReport {
        let remote_problem = match policy {
            PushPolicy::None => None,
            _ => self.remote_problem(),
        };

        let mut outcomes = Vec::with_capacity(requests.len());
        let mut cancelled = false;
        for (index, request) in requests.iter().enumerate() {
            if self.cancelled() {
                info!(done = index, remaining = requests.len() - index, "batch cancelled");
                cancelled = true;
                break;
            }
            let mut outcome = self.realize(request);
            if outcome.state == RequestState::Committed {
                match policy {
                    PushPolicy::AfterEach => {
                        self.push_one(&mut outcome, remote_problem.as_deref());
                    }
                    PushPolicy::None => outcome.state = RequestState::NotPushed,
                    PushPolicy::AfterAll => {}
                }
            }
            if (index + 1) % 10 == 0 {
                info!(processed = index + 1, total = requests.len(), "progress");
            }
            outcomes.push(outcome);
        }

        let success_count = outcomes.iter().filter(|o| o.state.is_committed()).count();
        let push = if policy == PushPolicy::AfterAll && success_count > 0 {
            self.push_all(&mut outcomes, remote_problem.as_deref())
        } else {
            PushOutcome::Skipped
        };

        info!(success_count, total = requests.len(), "batch finished");
        ExecutionReport {
            success_count,
            outcomes,
            push,
            cancelled,
        }
    }

    /// Log, stage, commit. Ends in `Committed`, `LogFailed` or `CommitFailed`.
    fn realize(&self, request: &CommitRequest) -> RequestOutcome {
        let mut outcome = RequestOutcome {
            request: request.clone(),
            state: RequestState::Pending,
            detail: None,
        };

        if let Err(e) = self.log.append(&CommitLogEntry::for_request(request)) {
            warn!(message = %request.message, error = %e, "log write failed, commit skipped");
            outcome.state = RequestState::LogFailed;
            outcome.detail = Some(e.to_string());
            return outcome;
        }
        outcome.state = RequestState::Logged;

        let staged = match self.vcs.add(&self.stage_path) {
            Ok(out) if out.success => Ok(()),
            Ok(out) => Err(format!("add failed: {}", out.output)),
            Err(e) => Err(e.to_string()),
        };
        let committed = staged.and_then(|()| match self.vcs.commit_backdated(request) {
            Ok(out) if out.success => Ok(()),
            Ok(out) => Err(format!("commit failed: {}", out.output)),
            Err(e) => Err(e.to_string()),
        });

        match committed {
            Ok(()) => {
                debug!(message = %request.message, "committed");
                outcome.state = RequestState::Committed;
            }
            Err(detail) => {
                warn!(message = %request.message, %detail, "commit failed");
                outcome.state = RequestState::CommitFailed;
                outcome.detail = Some(detail);
            }
        }
        outcome
    }

    /// Why pushing cannot work, if the remote is missing.
    fn remote_problem(&self) -> Option<String> {
        match self.vcs.remote_url(&self.remote) {
            Ok(Some(url)) => {
                debug!(remote = %self.remote, %url, "remote found");
                None
            }
            Ok(None) => Some(format!("remote '{}' is not configured", self.remote)),
            Err(e) => Some(e.to_string()),
        }
    }

    fn try_push(&self, remote_problem: Option<&str>) -> Result<(), String> {
        if let Some(problem) = remote_problem {
            return Err(problem.to_string());
        }
        match self.vcs.push() {
            Ok(out) if out.success => Ok(()),
            Ok(out) => Err(out.output),
            Err(e) => Err(e.to_string()),
        }
    }

    fn push_one(&self, outcome: &mut RequestOutcome, remote_problem: Option<&str>) {
        match self.try_push(remote_problem) {
            Ok(()) => outcome.state = RequestState::Pushed,
            Err(detail) => {
                warn!(message = %outcome.request.message, %detail, "push failed");
                outcome.state = RequestState::PushFailed;
                outcome.detail = Some(detail);
            }
        }
    }

    fn push_all(
        &self,
        outcomes: &mut [RequestOutcome],
        remote_problem: Option<&str>,
    ) -> PushOutcome {
        let result = self.try_push(remote_problem);
        let state = if result.is_ok() {
            RequestState::Pushed
        } else {
            RequestState::PushFailed
        };
        let committed = outcomes
            .iter_mut()
            .filter(|o| o.state == RequestState::Committed);
        for outcome in committed {
            outcome.state = state;
        }
        match result {
            Ok(()) => {
                info!(remote = %self.remote, "pushed batch");
                PushOutcome::Pushed
            }
            Err(detail) => {
                warn!(remote = %self.remote, %detail, "batch push failed");
                PushOutcome::Failed(detail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use super::*;
    use crate::grid::GridCoordinate;
    use crate::ports::VcsOutput;
    use crate::vcs::test_support::ScriptedExecutor;
    use chrono::NaiveDate;

    type PortError = Box<dyn std::error::Error + Send + Sync>;

    /// In-memory filesystem that can be told to refuse writes.
    #[derive(Default)]
    struct MemoryFs {
        contents: Mutex<Option<String>>,
        fail_writes: bool,
    }

    impl FileSystem for MemoryFs {
        fn read_to_string(&self, _path: &Path) -> Result<String, PortError> {
            let contents = self.contents.lock().unwrap();
            Ok(contents.clone().unwrap_or_default())
        }

        fn write(&self, _path: &Path, contents: &str) -> Result<(), PortError> {
            if self.fail_writes {
                return Err("disk full".into());
            }
            *self.contents.lock().unwrap() = Some(contents.to_string());
            Ok(())
        }

        fn exists(&self, _path: &Path) -> bool {
            self.contents.lock().unwrap().is_some()
        }
    }

    fn requests(n: u32) -> Vec<CommitRequest> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 7)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| {
                let timestamp = base + chrono::Duration::days(i64::from(i));
                CommitRequest::new(GridCoordinate::new(0, i), timestamp)
            })
            .collect()
    }

    fn all_in(report: &ExecutionReport, state: RequestState) -> bool {
        report.outcomes.iter().all(|o| o.state == state)
    }

    fn scheduler<'a>(fs: &'a MemoryFs, exec: &'a ScriptedExecutor) -> Scheduler<'a> {
        Scheduler::new(
            fs,
            exec,
            Path::new("/repo"),
            Path::new("/repo/data.json"),
            Path::new("data.json"),
        )
    }

    #[test]
    fn failed_commit_does_not_stop_the_batch() {
        let fs = MemoryFs::default();
        let exec = ScriptedExecutor::default()
            .on(&["commit"], VcsOutput::ok("[main 1] ok"))
            .on(&["commit"], VcsOutput::failed("index.lock exists"))
            .on(&["commit"], VcsOutput::ok("[main 3] ok"));

        let report = scheduler(&fs, &exec).execute(&requests(3), PushPolicy::None);

        assert_eq!(report.success_count, 2);
        let states: Vec<RequestState> = report.outcomes.iter().map(|o| o.state).collect();
        assert_eq!(
            states,
            [
                RequestState::NotPushed,
                RequestState::CommitFailed,
                RequestState::NotPushed,
            ]
        );
        let detail = report.outcomes[1].detail.as_deref().unwrap();
        assert!(detail.contains("index.lock"));
        assert_eq!(exec.calls_starting_with(&["commit"]).len(), 3);
        assert_eq!(report.push, PushOutcome::Skipped);
    }

    #[test]
    fn log_failure_skips_the_commit() {
        let fs = MemoryFs {
            fail_writes: true,
            ..MemoryFs::default()
        };
        let exec = ScriptedExecutor::default();

        let report = scheduler(&fs, &exec).execute(&requests(2), PushPolicy::None);

        assert_eq!(report.success_count, 0);
        assert!(all_in(&report, RequestState::LogFailed));
        assert!(exec.calls_starting_with(&["add"]).is_empty());
        assert!(exec.calls_starting_with(&["commit"]).is_empty());
    }

    #[test]
    fn every_request_is_logged_before_its_commit() {
        let fs = MemoryFs::default();
        let exec = ScriptedExecutor::default();

        scheduler(&fs, &exec).execute(&requests(3), PushPolicy::None);

        let raw = fs.read_to_string(Path::new("")).unwrap();
        let logged: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(logged.len(), 3);
        assert_eq!(logged[2]["date"], "2024-01-09 09:00:00");
        assert_eq!(logged[2]["y"], 2);
    }

    #[test]
    fn failed_stage_is_a_commit_failure() {
        let fs = MemoryFs::default();
        let unmatched = VcsOutput::failed("pathspec did not match");
        let exec = ScriptedExecutor::answering(&["add"], unmatched);

        let report = scheduler(&fs, &exec).execute(&requests(1), PushPolicy::None);

        assert_eq!(report.outcomes[0].state, RequestState::CommitFailed);
        assert!(exec.calls_starting_with(&["commit"]).is_empty());
    }

    #[test]
    fn after_all_pushes_once() {
        let fs = MemoryFs::default();
        let exec = ScriptedExecutor::with_remote();

        let report = scheduler(&fs, &exec).execute(&requests(4), PushPolicy::AfterAll);

        assert_eq!(report.push, PushOutcome::Pushed);
        assert_eq!(exec.calls_starting_with(&["push"]).len(), 1);
        assert!(all_in(&report, RequestState::Pushed));
    }

    #[test]
    fn after_all_push_failure_keeps_commits() {
        let fs = MemoryFs::default();
        let exec = ScriptedExecutor::default()
            .on(&["remote"], VcsOutput::ok("git@example.com:me/art.git"))
            .on(&["push"], VcsOutput::failed("rejected"));

        let report = scheduler(&fs, &exec).execute(&requests(2), PushPolicy::AfterAll);

        assert_eq!(report.success_count, 2);
        assert_eq!(report.push, PushOutcome::Failed("rejected".to_string()));
        assert!(all_in(&report, RequestState::PushFailed));
    }

    #[test]
    fn after_all_without_successes_does_not_push() {
        let fs = MemoryFs::default();
        let exec = ScriptedExecutor::default()
            .on(&["remote"], VcsOutput::ok("url"))
            .on(&["commit"], VcsOutput::failed("nothing to commit"));

        let report = scheduler(&fs, &exec).execute(&requests(2), PushPolicy::AfterAll);

        assert_eq!(report.push, PushOutcome::Skipped);
        assert!(exec.calls_starting_with(&["push"]).is_empty());
    }

    #[test]
    fn missing_remote_marks_pushes_failed_without_pushing() {
        let fs = MemoryFs::default();
        let missing = VcsOutput::failed("No such remote");
        let exec = ScriptedExecutor::answering(&["remote"], missing);

        let report = scheduler(&fs, &exec).execute(&requests(2), PushPolicy::AfterEach);

        assert!(exec.calls_starting_with(&["push"]).is_empty());
        assert!(all_in(&report, RequestState::PushFailed));
        let detail = report.outcomes[0].detail.as_deref().unwrap();
        assert!(detail.contains("origin"));
    }

    #[test]
    fn after_each_pushes_every_commit() {
        let fs = MemoryFs::default();
        let exec = ScriptedExecutor::with_remote();

        let report = scheduler(&fs, &exec).execute(&requests(3), PushPolicy::AfterEach);

        assert_eq!(exec.calls_starting_with(&["push"]).len(), 3);
        assert!(all_in(&report, RequestState::Pushed));
    }

    #[test]
    fn cancellation_is_checked_between_requests() {
        let fs = MemoryFs::default();
        let exec = ScriptedExecutor::default();
        let flag = AtomicBool::new(true);

        let report = scheduler(&fs, &exec)
            .with_cancel_flag(&flag)
            .execute(&requests(3), PushPolicy::None);

        assert!(report.cancelled);
        assert!(report.outcomes.is_empty());
        assert!(exec.calls_starting_with(&["commit"]).is_empty());
    }
}
