//! `gridstamp stats` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::log::CommitLog;
use crate::vcs::{stats, Vcs};

/// Execute the `stats` command.
///
/// # Errors
///
/// Returns an error string if the repository has no history or git is
/// unavailable.
pub fn run(ctx: &ServiceContext, settings: &Settings) -> Result<(), String> {
    let vcs = Vcs::new(ctx.vcs.as_ref(), &settings.repo_path);
    let stats = stats(&vcs)
        .map_err(|e| format!("Could not read commit statistics: {e}"))?;
    let log = CommitLog::new(ctx.fs.as_ref(), &settings.data_path());
    let logged = log.read_all().len();

    println!("Total commits:     {}", stats.total);
    println!("Generated commits: {}", stats.generated.len());
    println!("Log entries:       {logged}");
    Ok(())
}
