//! Finding generated commits and rolling them back.

use tracing::{info, warn};

use super::{Vcs, VcsError};

/// `git log --grep` patterns that identify generated commits.
///
/// The first matches the current message template; the second catches
/// messages written by older releases.
pub const GENERATED_MARKERS: [&str; 2] = ["^Commit for [0-9]", "hack commit"];

/// Commit counts for the `stats` report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStats {
    /// Commits reachable from `HEAD`.
    pub total: u64,
    /// Generated commits, newest first.
    pub generated: Vec<String>,
}

/// What a revert would do, computed before anything is changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevertPlan {
    /// Generated commits, newest first.
    pub generated: Vec<String>,
    /// Parent of the oldest generated commit; `HEAD` is reset here.
    pub target: String,
    /// Commits in `target..HEAD`, generated or not, that the reset drops.
    pub discarded: u64,
}

/// A failed step of a revert, with what to do about it.
#[derive(Debug, thiserror::Error)]
pub enum RevertError {
    /// Looking up commits failed before anything changed.
    #[error("could not inspect repository history: {0}")]
    Inspect(#[source] VcsError),

    /// The oldest generated commit is the root commit.
    #[error(
        "oldest generated commit {commit} has no parent; nothing was changed. \
         To discard everything, recreate the branch manually"
    )]
    RootCommit {
        /// The root commit hash.
        commit: String,
    },

    /// `reset --hard` failed.
    #[error(
        "reset to {target} failed: {output}. The repository may be partly reset; \
         run `git reset --hard {target}` manually"
    )]
    Reset {
        /// Intended reset target.
        target: String,
        /// What git printed.
        output: String,
    },

    /// The local reset succeeded but the current branch could not be determined.
    #[error(
        "local history was reset to {target} but the current branch is unknown ({reason}); \
         run `git push --force {remote} <branch>` manually"
    )]
    Branch {
        /// Commit the branch now points at.
        target: String,
        /// Remote that should have been updated.
        remote: String,
        /// Why no branch was found.
        reason: String,
    },

    /// The force-push was rejected.
    #[error(
        "local history was reset to {target} but force-push failed: {output}; \
         run `git push --force {remote} {branch}` manually"
    )]
    Push {
        /// Commit the branch now points at.
        target: String,
        /// Remote that was pushed to.
        remote: String,
        /// Branch that was pushed.
        branch: String,
        /// What git printed.
        output: String,
    },
}

/// Generated commits, newest first, each listed once.
///
/// # Errors
///
/// Returns [`VcsError::Unavailable`] when git cannot be started.
pub fn find_generated(vcs: &Vcs<'_>) -> Result<Vec<String>, VcsError> {
    let mut found: Vec<String> = Vec::new();
    for marker in GENERATED_MARKERS {
        for hash in vcs.grep_log(marker)? {
            if !found.contains(&hash) {
                found.push(hash);
            }
        }
    }
    Ok(found)
}

/// Total and generated commit counts.
///
/// # Errors
///
/// Fails when the repository has no commits or git cannot be started.
pub fn stats(vcs: &Vcs<'_>) -> Result<RepoStats, VcsError> {
    Ok(RepoStats {
        total: vcs.commit_count()?,
        generated: find_generated(vcs)?,
    })
}

/// Works out what a revert would discard without changing anything.
///
/// Returns `None` when there are no generated commits.
///
/// # Errors
///
/// Returns [`RevertError::RootCommit`] when the oldest generated commit has
/// no parent, or [`RevertError::Inspect`] when history cannot be read.
pub fn plan_revert(vcs: &Vcs<'_>) -> Result<Option<RevertPlan>, RevertError> {
    let generated = find_generated(vcs).map_err(RevertError::Inspect)?;
    let Some(oldest) = generated.last() else {
        return Ok(None);
    };
    let target = vcs
        .parent_of(oldest)
        .map_err(RevertError::Inspect)?
        .ok_or_else(|| RevertError::RootCommit {
            commit: oldest.clone(),
        })?;
    let discarded = vcs.count_since(&target).map_err(RevertError::Inspect)?;
    Ok(Some(RevertPlan {
        generated,
        target,
        discarded,
    }))
}

/// Resets to `plan.target` and, when `force_push_to` names a remote,
/// force-pushes the current branch there.
///
/// # Errors
///
/// Returns a [`RevertError`] naming the step that failed and the command
/// needed to finish by hand.
pub fn execute_revert(
    vcs: &Vcs<'_>,
    plan: &RevertPlan,
    force_push_to: Option<&str>,
) -> Result<(), RevertError> {
    let target = plan.target.clone();
    let reset = vcs.reset_hard(&target).map_err(|e| RevertError::Reset {
        target: target.clone(),
        output: e.to_string(),
    })?;
    if !reset.success {
        return Err(RevertError::Reset {
            target,
            output: reset.output,
        });
    }
    info!(%target, discarded = plan.discarded, "reset local history");

    let Some(remote) = force_push_to else {
        return Ok(());
    };
    let branch = match vcs.current_branch() {
        Ok(Some(branch)) => branch,
        Ok(None) => {
            return Err(RevertError::Branch {
                target,
                remote: remote.to_string(),
                reason: "detached HEAD".to_string(),
            })
        }
        Err(e) => {
            return Err(RevertError::Branch {
                target,
                remote: remote.to_string(),
                reason: e.to_string(),
            })
        }
    };

    let pushed = vcs.force_push(remote, &branch);
    let push = pushed.map_err(|e| RevertError::Push {
        target: target.clone(),
        remote: remote.to_string(),
        branch: branch.clone(),
        output: e.to_string(),
    })?;
    if !push.success {
        warn!(%remote, %branch, output = %push.output, "force-push failed");
        return Err(RevertError::Push {
            target,
            remote: remote.to_string(),
            branch,
            output: push.output,
        });
    }
    info!(%remote, %branch, "force-pushed");
    Ok(())
}
