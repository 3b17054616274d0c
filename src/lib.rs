//! Core library entry for the `gridstamp` CLI.
//!
//! `gridstamp` paints a contribution graph by creating backdated commits.
//! The [`grid`] module maps cells, patterns and text to timestamps; the
//! [`schedule`] module logs and commits them through the [`ports`] that
//! [`context::ServiceContext`] wires to live, recording or replaying
//! adapters.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod grid;
pub mod log;
pub mod logging;
pub mod ports;
pub mod schedule;
pub mod vcs;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails, the settings are
/// invalid, or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        // `--help` and `--version` arrive as errors that belong on stdout.
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    let settings = config::Settings::from_args(&cli.global).map_err(|e| e.to_string())?;
    logging::init(settings.log_level());
    commands::dispatch(&settings, &cli.command)
}
