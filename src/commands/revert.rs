//! `gridstamp revert` command.

use inquire::Confirm;

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::vcs::{execute_revert, plan_revert, Vcs};

/// Execute the `revert` command.
///
/// Shows what would be discarded and asks before resetting, unless `yes`.
///
/// # Errors
///
/// Returns an error string naming the failed step and how to recover.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    yes: bool,
    force_push: bool,
) -> Result<(), String> {
    let vcs = Vcs::new(ctx.vcs.as_ref(), &settings.repo_path);
    let Some(plan) = plan_revert(&vcs).map_err(|e| e.to_string())? else {
        println!("No generated commits found.");
        return Ok(());
    };

    let short = plan.target.get(..12).unwrap_or(&plan.target);
    println!("Found {} generated commit(s).", plan.generated.len());
    let discarded = plan.discarded;
    println!("Resetting to {short} discards {discarded} commit(s) from the current branch.");
    let push_to = force_push
        .then_some(settings.remote.as_str())
        .filter(|_| !settings.no_push);
    if let Some(remote) = push_to {
        println!("The branch will then be force-pushed to {remote}.");
    }
    if settings.dry_run {
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new("Rewrite history and discard these commits?")
            .with_default(false)
            .prompt()
            .map_err(|e| format!("Confirmation failed: {e}"))?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    execute_revert(&vcs, &plan, push_to).map_err(|e| e.to_string())?;
    println!("Reverted {} generated commit(s).", plan.generated.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::run;
    use crate::commands::test_support::{context, settings};
    use crate::config::Settings;
    use crate::ports::VcsOutput;
    use crate::vcs::test_support::ScriptedExecutor;

    fn history() -> ScriptedExecutor {
        ScriptedExecutor::default()
            .on(
                &["log", "--grep=^Commit for [0-9]"],
                VcsOutput::ok("c2\nc1"),
            )
            .on(&["rev-parse"], VcsOutput::ok("base"))
            .on(&["rev-list"], VcsOutput::ok("2"))
            .on(&["branch"], VcsOutput::ok("main"))
    }

    #[test]
    fn confirmed_revert_resets_and_pushes() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Arc::new(history());

        run(&context(&exec), &settings(dir.path()), true, true).unwrap();

        let reset = &exec.calls_starting_with(&["reset"])[0];
        assert_eq!(reset.args, ["reset", "--hard", "base"]);
        let push = &exec.calls_starting_with(&["push"])[0];
        assert_eq!(push.args, ["push", "--force", "origin", "main"]);
    }

    #[test]
    fn no_push_keeps_revert_local() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Arc::new(history());
        let settings = Settings {
            no_push: true,
            ..settings(dir.path())
        };

        run(&context(&exec), &settings, true, true).unwrap();

        assert_eq!(exec.calls_starting_with(&["reset"]).len(), 1);
        assert!(exec.calls_starting_with(&["push"]).is_empty());
    }

    #[test]
    fn dry_run_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Arc::new(history());
        let settings = Settings {
            dry_run: true,
            ..settings(dir.path())
        };

        run(&context(&exec), &settings, true, true).unwrap();

        assert!(exec.calls_starting_with(&["reset"]).is_empty());
    }

    #[test]
    fn nothing_to_revert_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Arc::new(ScriptedExecutor::default());
        assert!(run(&context(&exec), &settings(dir.path()), true, true).is_ok());
        assert!(exec.calls_starting_with(&["reset"]).is_empty());
    }
}
