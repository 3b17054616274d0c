//! Typed git operations over the [`VcsExecutor`] port.

pub mod revert;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::grid::{format_timestamp, CommitRequest};
use crate::ports::{VcsExecutor, VcsOutput};

pub use revert::{
    execute_revert, find_generated, plan_revert, stats, RepoStats, RevertError, RevertPlan,
};

/// Environment variables git reads for the author and committer dates.
pub const DATE_ENV_VARS: [&str; 2] = ["GIT_AUTHOR_DATE", "GIT_COMMITTER_DATE"];

/// Errors from git operations.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// The executor could not start `git` at all.
    #[error("git is unavailable (git {command}): {source}")]
    Unavailable {
        /// Arguments of the attempted command.
        command: String,
        /// Spawn error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The command ran and failed.
    #[error("git {command} failed: {output}")]
    Failed {
        /// Arguments of the failed command.
        command: String,
        /// What git printed.
        output: String,
    },

    /// The command succeeded but printed something unexpected.
    #[error("unexpected output from git {command}: {output:?}")]
    Parse {
        /// Arguments of the command.
        command: String,
        /// What git printed.
        output: String,
    },

    /// `status` failed and `init` could not create a repository either.
    #[error("{path} is not a git repository and could not be initialized: {output}")]
    InitFailed {
        /// Repository path.
        path: PathBuf,
        /// Output of `git init`.
        output: String,
    },
}

/// A git working tree driven through an executor.
pub struct Vcs<'a> {
    exec: &'a dyn VcsExecutor,
    repo: PathBuf,
}

impl<'a> Vcs<'a> {
    /// Binds `exec` to the working tree at `repo`.
    #[must_use]
    pub fn new(exec: &'a dyn VcsExecutor, repo: &Path) -> Self {
        Self {
            exec,
            repo: repo.to_path_buf(),
        }
    }

    /// Path of the working tree.
    #[must_use]
    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// Runs `git <args>` with `env` overrides, reporting failure as data.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when git cannot be started.
    pub fn run_with_env(
        &self,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<VcsOutput, VcsError> {
        debug!(args = ?args, repo = %self.repo.display(), "git");
        let output = self
            .exec
            .run(args, &self.repo, env)
            .map_err(|source| VcsError::Unavailable {
                command: args.join(" "),
                source,
            })?;
        if !output.success {
            debug!(args = ?args, output = %output.output, "git command failed");
        }
        Ok(output)
    }

    /// Runs `git <args>`, reporting failure as data.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when git cannot be started.
    pub fn run(&self, args: &[&str]) -> Result<VcsOutput, VcsError> {
        self.run_with_env(args, &[])
    }

    /// Runs `git <args>` and returns its output, treating failure as an error.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Failed`] when the command fails.
    pub fn run_checked(&self, args: &[&str]) -> Result<String, VcsError> {
        let output = self.run(args)?;
        if output.success {
            Ok(output.output)
        } else {
            Err(VcsError::Failed {
                command: args.join(" "),
                output: output.output,
            })
        }
    }

    /// Makes sure the working tree is a repository, running `git init` if
    /// `git status` fails. Returns `true` when a repository was created.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::InitFailed`] when neither works, or
    /// [`VcsError::Unavailable`] when git cannot be started.
    pub fn ensure_repository(&self) -> Result<bool, VcsError> {
        if self.run(&["status"])?.success {
            return Ok(false);
        }
        let init = self.run(&["init"])?;
        if init.success {
            info!(repo = %self.repo.display(), "initialized git repository");
            Ok(true)
        } else {
            Err(VcsError::InitFailed {
                path: self.repo.clone(),
                output: init.output,
            })
        }
    }

    /// `git add <path>`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when git cannot be started.
    pub fn add(&self, path: &Path) -> Result<VcsOutput, VcsError> {
        let path = path.to_string_lossy();
        self.run(&["add", "--", path.as_ref()])
    }

    /// `git commit -m <message>` with the author and committer dates set to
    /// the request's timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when git cannot be started.
    pub fn commit_backdated(&self, request: &CommitRequest) -> Result<VcsOutput, VcsError> {
        let date = format_timestamp(request.timestamp);
        let env = DATE_ENV_VARS.map(|var| (var, date.as_str()));
        self.run_with_env(&["commit", "-m", &request.message], &env)
    }

    /// Plain `git push`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when git cannot be started.
    pub fn push(&self) -> Result<VcsOutput, VcsError> {
        self.run(&["push"])
    }

    /// `git push --force <remote> <branch>`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when git cannot be started.
    pub fn force_push(&self, remote: &str, branch: &str) -> Result<VcsOutput, VcsError> {
        self.run(&["push", "--force", remote, branch])
    }

    /// URL of `remote`, or `None` when it is not configured.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when git cannot be started.
    pub fn remote_url(&self, remote: &str) -> Result<Option<String>, VcsError> {
        let output = self.run(&["remote", "get-url", remote])?;
        let url = output.success.then_some(output.output);
        Ok(url.filter(|url| !url.is_empty()))
    }

    /// Hashes of commits whose message matches `pattern`, newest first.
    ///
    /// A failing `git log` (for example on a repository with no commits)
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when git cannot be started.
    pub fn grep_log(&self, pattern: &str) -> Result<Vec<String>, VcsError> {
        let grep = format!("--grep={pattern}");
        let output = self.run(&["log", &grep, "--pretty=format:%H"])?;
        if !output.success {
            return Ok(Vec::new());
        }
        Ok(output
            .output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// Number of commits reachable from `HEAD`.
    ///
    /// # Errors
    ///
    /// Fails when the repository has no commits or git prints a non-number.
    pub fn commit_count(&self) -> Result<u64, VcsError> {
        self.count(&["rev-list", "--count", "HEAD"])
    }

    /// Number of commits in `from..HEAD`.
    ///
    /// # Errors
    ///
    /// Fails when the range is invalid or git prints a non-number.
    pub fn count_since(&self, from: &str) -> Result<u64, VcsError> {
        let range = format!("{from}..HEAD");
        self.count(&["rev-list", "--count", &range])
    }

    fn count(&self, args: &[&str]) -> Result<u64, VcsError> {
        let text = self.run_checked(args)?;
        text.trim().parse().map_err(|_| VcsError::Parse {
            command: args.join(" "),
            output: text,
        })
    }

    /// Hash of the first parent of `commit`, or `None` for a root commit.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when git cannot be started.
    pub fn parent_of(&self, commit: &str) -> Result<Option<String>, VcsError> {
        let revision = format!("{commit}^");
        let output = self.run(&["rev-parse", "--verify", "--quiet", &revision])?;
        let parent = output.success.then(|| output.output.trim().to_string());
        Ok(parent.filter(|hash| !hash.is_empty()))
    }

    /// `git reset --hard <target>`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when git cannot be started.
    pub fn reset_hard(&self, target: &str) -> Result<VcsOutput, VcsError> {
        self.run(&["reset", "--hard", target])
    }

    /// Name of the checked-out branch, or `None` on a detached HEAD.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Failed`] when git cannot report a branch.
    pub fn current_branch(&self) -> Result<Option<String>, VcsError> {
        let name = self.run_checked(&["branch", "--show-current"])?;
        let name = name.trim();
        Ok((!name.is_empty()).then(|| name.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scripted executor for exercising git-driven code without git.

    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::Mutex;

    use crate::ports::{VcsExecutor, VcsOutput};

    /// A recorded invocation.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Call {
        pub args: Vec<String>,
        pub env: Vec<(String, String)>,
    }

    /// Answers each call with the first rule whose prefix matches, falling
    /// back to success with empty output.
    #[derive(Default)]
    pub struct ScriptedExecutor {
        rules: Mutex<Vec<(Vec<String>, VecDeque<VcsOutput>)>>,
        pub calls: Mutex<Vec<Call>>,
    }

    impl ScriptedExecutor {
        /// Answers calls starting with `prefix` with `output`.
        pub fn answering(prefix: &[&str], output: VcsOutput) -> Self {
            Self::default().on(prefix, output)
        }

        /// Answers `remote get-url` so pushes are attempted.
        pub fn with_remote() -> Self {
            Self::answering(&["remote"], VcsOutput::ok("git@example.com:me/art.git"))
        }

        pub fn on(self, prefix: &[&str], output: VcsOutput) -> Self {
            {
                let mut rules = self.rules.lock().unwrap();
                let key: Vec<String> = prefix.iter().map(|s| (*s).to_string()).collect();
                match rules.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, queue)) => queue.push_back(output),
                    None => rules.push((key, VecDeque::from([output]))),
                }
            }
            self
        }

        pub fn calls_starting_with(&self, prefix: &[&str]) -> Vec<Call> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| starts_with(c.args.as_slice(), prefix))
                .cloned()
                .collect()
        }
    }

    fn starts_with<A: AsRef<str>, P: AsRef<str>>(args: &[A], prefix: &[P]) -> bool {
        args.len() >= prefix.len()
            && args
                .iter()
                .zip(prefix)
                .all(|(a, p)| a.as_ref() == p.as_ref())
    }

    impl VcsExecutor for ScriptedExecutor {
        fn run(
            &self,
            args: &[&str],
            _cwd: &Path,
            env: &[(&str, &str)],
        ) -> Result<VcsOutput, Box<dyn std::error::Error + Send + Sync>> {
            self.calls.lock().unwrap().push(Call {
                args: args.iter().map(|s| (*s).to_string()).collect(),
                env: env
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            });
            let mut rules = self.rules.lock().unwrap();
            for (prefix, queue) in rules.iter_mut() {
                if starts_with(args, prefix.as_slice()) {
                    // The last scripted output repeats once the queue drains.
                    let output = if queue.len() > 1 {
                        queue.pop_front()
                    } else {
                        queue.front().cloned()
                    };
                    return Ok(output.unwrap_or_else(|| VcsOutput::ok("")));
                }
            }
            Ok(VcsOutput::ok(""))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ScriptedExecutor;
    use super::*;
    use chrono::NaiveDate;

    fn vcs(exec: &ScriptedExecutor) -> Vcs<'_> {
        Vcs::new(exec, Path::new("/repo"))
    }

    #[test]
    fn existing_repository_is_left_alone() {
        let exec = ScriptedExecutor::default();
        assert!(!vcs(&exec).ensure_repository().unwrap());
        assert!(exec.calls_starting_with(&["init"]).is_empty());
    }

    #[test]
    fn missing_repository_is_initialized() {
        let missing = VcsOutput::failed("not a git repository");
        let exec = ScriptedExecutor::answering(&["status"], missing);
        assert!(vcs(&exec).ensure_repository().unwrap());
        assert_eq!(exec.calls_starting_with(&["init"]).len(), 1);
    }

    #[test]
    fn uninitializable_repository_is_fatal() {
        let exec = ScriptedExecutor::default()
            .on(&["status"], VcsOutput::failed("not a git repository"))
            .on(&["init"], VcsOutput::failed("permission denied"));
        assert!(matches!(
            vcs(&exec).ensure_repository(),
            Err(VcsError::InitFailed { .. })
        ));
    }

    #[test]
    fn commit_sets_both_date_variables() {
        let exec = ScriptedExecutor::default();
        let ts = NaiveDate::from_ymd_opt(2023, 7, 2)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();

        vcs(&exec)
            .commit_backdated(&CommitRequest::new(None, ts))
            .unwrap();

        let call = &exec.calls_starting_with(&["commit"])[0];
        let message = "Commit for 2023-07-02 08:15:00";
        assert_eq!(call.args, ["commit", "-m", message]);
        assert_eq!(
            call.env,
            [
                ("GIT_AUTHOR_DATE".to_string(), "2023-07-02 08:15:00".to_string()),
                ("GIT_COMMITTER_DATE".to_string(), "2023-07-02 08:15:00".to_string()),
            ]
        );
    }

    #[test]
    fn commit_count_parses_and_rejects_garbage() {
        let exec = ScriptedExecutor::answering(&["rev-list"], VcsOutput::ok("42\n"));
        assert_eq!(vcs(&exec).commit_count().unwrap(), 42);

        let exec = ScriptedExecutor::answering(&["rev-list"], VcsOutput::ok("lots"));
        assert!(matches!(vcs(&exec).commit_count(), Err(VcsError::Parse { .. })));
    }

    #[test]
    fn missing_remote_is_none() {
        let missing = VcsOutput::failed("error: No such remote 'origin'");
        let exec = ScriptedExecutor::answering(&["remote"], missing);
        assert_eq!(vcs(&exec).remote_url("origin").unwrap(), None);

        let exec = ScriptedExecutor::with_remote();
        assert!(vcs(&exec).remote_url("origin").unwrap().is_some());
    }

    #[test]
    fn root_commit_has_no_parent() {
        let exec = ScriptedExecutor::answering(&["rev-parse"], VcsOutput::failed(""));
        assert_eq!(vcs(&exec).parent_of("abc").unwrap(), None);
    }

    #[test]
    fn detached_head_has_no_branch() {
        let exec = ScriptedExecutor::answering(&["branch"], VcsOutput::ok(""));
        assert_eq!(vcs(&exec).current_branch().unwrap(), None);
    }
}
