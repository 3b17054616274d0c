//! `gridstamp random` command.

use super::{execute_plan, mapper};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::schedule::PushPolicy;

/// Execute the `random` command: `count` commits on uniformly drawn cells.
///
/// # Errors
///
/// Returns an error string if the window cannot be placed on the calendar
/// or the repository cannot be used.
pub fn run(ctx: &ServiceContext, settings: &Settings, count: u32) -> Result<(), String> {
    let plan = mapper(ctx, settings)
        .scatter(count)
        .map_err(|e| e.to_string())?;
    execute_plan(ctx, settings, &plan, PushPolicy::AfterAll)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::run;
    use crate::commands::test_support::{context, settings};
    use crate::config::Settings;
    use crate::vcs::test_support::ScriptedExecutor;

    #[test]
    fn dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Arc::new(ScriptedExecutor::default());
        let settings = Settings {
            dry_run: true,
            ..settings(dir.path())
        };

        run(&context(&exec), &settings, 50).unwrap();

        assert!(exec.calls.lock().unwrap().is_empty());
        assert!(!dir.path().join("data.json").exists());
    }

    #[test]
    fn no_push_suppresses_the_batch_push() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Arc::new(ScriptedExecutor::default());
        let settings = Settings {
            no_push: true,
            ..settings(dir.path())
        };

        run(&context(&exec), &settings, 5).unwrap();

        assert!(!exec.calls_starting_with(&["commit"]).is_empty());
        assert!(exec.calls_starting_with(&["remote"]).is_empty());
        assert!(exec.calls_starting_with(&["push"]).is_empty());
    }
}
