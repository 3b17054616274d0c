//! `gridstamp yesterday` command.

use super::{execute_plan, mapper};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::grid::Plan;
use crate::schedule::PushPolicy;

/// Execute the `yesterday` command: one unpushed commit dated 24 hours ago.
///
/// # Errors
///
/// Returns an error string if the repository cannot be used.
pub fn run(ctx: &ServiceContext, settings: &Settings) -> Result<(), String> {
    let plan = Plan {
        requests: vec![mapper(ctx, settings).yesterday()],
        skipped: 0,
    };
    execute_plan(ctx, settings, &plan, PushPolicy::None)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::run;
    use crate::commands::test_support::{context, settings};
    use crate::vcs::test_support::ScriptedExecutor;

    #[test]
    fn commits_once_without_pushing() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Arc::new(ScriptedExecutor::default());

        run(&context(&exec), &settings(dir.path())).unwrap();

        let commits = exec.calls_starting_with(&["commit"]);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].args[2], "Commit for 2024-05-14 12:00:00");
        assert!(exec.calls_starting_with(&["push"]).is_empty());
        let log = std::fs::read_to_string(dir.path().join("data.json")).unwrap();
        assert!(log.contains("2024-05-14 12:00:00"));
    }
}
