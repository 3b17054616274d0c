//! Command dispatch and handlers.

pub mod commit;
pub mod fill;
pub mod pattern;
pub mod random;
pub mod revert;
pub mod stats;
pub mod yesterday;

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

use tracing::{info, warn};

use crate::cassette::session::RecordingSession;
use crate::cli::Command;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::grid::{format_timestamp, render_preview, CommitRequest, GridMapper, Plan};
use crate::schedule::{ExecutionReport, PushOutcome, PushPolicy, Scheduler};
use crate::vcs::Vcs;

/// Environment variable naming a directory to record cassettes into.
pub const RECORD_ENV: &str = "GRIDSTAMP_RECORD";

/// Dispatch a parsed command to its handler.
///
/// When `GRIDSTAMP_RECORD` is set to a directory path, all port
/// interactions are recorded to per-port cassette files in that directory.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(settings: &Settings, command: &Command) -> Result<(), String> {
    let Some(record_dir) = env::var_os(RECORD_ENV) else {
        let ctx = ServiceContext::live(settings);
        return dispatch_with_context(&ctx, settings, command);
    };

    let session = RecordingSession::new(&PathBuf::from(record_dir), &settings.repo_path)?;
    let ctx = ServiceContext::recording(&session, settings);
    let result = dispatch_with_context(&ctx, settings, command);

    // The adapters hold the recorders; release them before finishing.
    drop(ctx);
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());

    result
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_context(
    ctx: &ServiceContext,
    settings: &Settings,
    command: &Command,
) -> Result<(), String> {
    match command {
        Command::Yesterday => yesterday::run(ctx, settings),
        Command::Commit { x, y } => commit::run(ctx, settings, *x, *y),
        Command::Random { count } => random::run(ctx, settings, *count),
        Command::Fill {
            min_commits,
            max_commits,
            frequency,
            weekend_dampening,
        } => {
            let options = fill::options(
                settings,
                *min_commits,
                *max_commits,
                *frequency,
                *weekend_dampening,
            );
            fill::run(ctx, settings, &options)
        }
        Command::Pattern { file } => pattern::run_file(ctx, settings, file),
        Command::Preset { name, placement } => {
            pattern::run_preset(ctx, settings, *name, *placement)
        }
        Command::Text { text, placement } => pattern::run_text(ctx, settings, text, *placement),
        Command::Stats => stats::run(ctx, settings),
        Command::Revert { yes, no_force_push } => {
            revert::run(ctx, settings, *yes, !*no_force_push)
        }
    }
}

/// A mapper over the context's clock and RNG using the configured grid.
fn mapper<'a>(ctx: &'a ServiceContext, settings: &Settings) -> GridMapper<'a> {
    GridMapper::new(
        ctx.clock.as_ref(),
        ctx.random.as_ref(),
        settings.week_start,
        settings.weeks,
    )
}

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static INTERRUPT_HANDLER: Once = Once::new();

/// The Ctrl-C flag, cleared for a new batch.
///
/// The first interrupt lets the current request finish and stops the batch.
/// A second one exits at once.
fn interrupt_flag() -> &'static AtomicBool {
    INTERRUPT_HANDLER.call_once(|| {
        let installed = ctrlc::set_handler(|| {
            if INTERRUPTED.swap(true, Ordering::SeqCst) {
                std::process::exit(130);
            }
            eprintln!("Stopping after the current commit. Press Ctrl-C again to abort.");
        });
        if let Err(e) = installed {
            warn!(error = %e, "Ctrl-C handler not installed; batches cannot be interrupted");
        }
    });
    INTERRUPTED.store(false, Ordering::SeqCst);
    &INTERRUPTED
}

/// Previews or executes a plan, then prints the report.
///
/// Ctrl-C stops the batch between requests.
///
/// # Errors
///
/// Fails only on environment errors: git missing or the repository
/// unusable. Individual commit failures are reported, not returned.
fn execute_plan(
    ctx: &ServiceContext,
    settings: &Settings,
    plan: &Plan,
    default: PushPolicy,
) -> Result<(), String> {
    execute_plan_until(ctx, settings, plan, default, interrupt_flag())
}

/// [`execute_plan`] with an explicit cancel flag.
fn execute_plan_until(
    ctx: &ServiceContext,
    settings: &Settings,
    plan: &Plan,
    default: PushPolicy,
    cancel: &AtomicBool,
) -> Result<(), String> {
    if plan.skipped > 0 {
        let (skipped, weeks) = (plan.skipped, settings.weeks);
        println!("Skipped {skipped} cell(s) in the future or outside the {weeks}-week window.");
    }
    if settings.dry_run {
        let preview = render_preview(&plan.coordinates(), settings.weeks, settings.week_start);
        print!("{preview}");
        print_span(&plan.requests);
        return Ok(());
    }
    if plan.requests.is_empty() {
        println!("Nothing to commit.");
        return Ok(());
    }

    let vcs = Vcs::new(ctx.vcs.as_ref(), &settings.repo_path);
    if vcs.ensure_repository().map_err(|e| e.to_string())? {
        let repo = settings.repo_path.display();
        println!("Initialized git repository in {repo}");
    }

    let policy = settings.push_policy(default);
    info!(requests = plan.requests.len(), ?policy, "executing");
    let scheduler = Scheduler::new(
        ctx.fs.as_ref(),
        ctx.vcs.as_ref(),
        &settings.repo_path,
        &settings.data_path(),
        &settings.data_file,
    )
    .with_remote(&settings.remote)
    .with_cancel_flag(cancel);
    let report = scheduler.execute(&plan.requests, policy);
    print_report(&report, policy);
    Ok(())
}

fn print_span(requests: &[CommitRequest]) {
    match (requests.first(), requests.last()) {
        (Some(first), Some(last)) => println!(
            "Would make {} commit(s) from {} to {}.",
            requests.len(),
            format_timestamp(first.timestamp),
            format_timestamp(last.timestamp)
        ),
        _ => println!("Would make no commits."),
    }
}

fn print_report(report: &ExecutionReport, policy: PushPolicy) {
    for outcome in &report.outcomes {
        let message = &outcome.request.message;
        let state = outcome.state;
        let mark = if state.is_committed() { "ok" } else { "FAILED" };
        let cell = match outcome.request.coordinate {
            Some(c) => format!(" {c}"),
            None => String::new(),
        };
        match &outcome.detail {
            Some(detail) => println!("{mark:>6} {message}{cell} [{state}] {detail}"),
            None => println!("{mark:>6} {message}{cell} [{state}]"),
        }
    }
    match (&report.push, policy) {
        (PushOutcome::Pushed, _) => println!("Pushed all commits."),
        (PushOutcome::Failed(detail), _) => println!("Push failed: {detail}"),
        (PushOutcome::Skipped, PushPolicy::None) => println!("Not pushed."),
        (PushOutcome::Skipped, _) => {}
    }
    let total = report.outcomes.len();
    if report.cancelled {
        println!("Cancelled after {total} request(s).");
    }
    println!("{} of {total} commit(s) succeeded.", report.success_count);
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use super::test_support::{context, settings};
    use super::{execute_plan_until, mapper};
    use crate::grid::GridCoordinate;
    use crate::schedule::PushPolicy;
    use crate::vcs::test_support::ScriptedExecutor;

    #[test]
    fn interrupted_batch_makes_no_commits() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Arc::new(ScriptedExecutor::default());
        let ctx = context(&exec);
        let settings = settings(dir.path());
        let cells = [GridCoordinate { week: 10, day: 1 }];
        let plan = mapper(&ctx, &settings).plan(&cells).unwrap();
        let interrupted = AtomicBool::new(true);

        execute_plan_until(&ctx, &settings, &plan, PushPolicy::None, &interrupted).unwrap();

        assert_eq!(plan.requests.len(), 1);
        assert!(exec.calls_starting_with(&["commit"]).is_empty());
        assert!(!dir.path().join("data.json").exists());
    }

    #[test]
    fn clear_flag_runs_the_whole_batch() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Arc::new(ScriptedExecutor::default());
        let ctx = context(&exec);
        let settings = settings(dir.path());
        let cells = [GridCoordinate { week: 10, day: 1 }];
        let plan = mapper(&ctx, &settings).plan(&cells).unwrap();
        let interrupted = AtomicBool::new(false);

        execute_plan_until(&ctx, &settings, &plan, PushPolicy::None, &interrupted).unwrap();

        assert_eq!(exec.calls_starting_with(&["commit"]).len(), 1);
    }
}
