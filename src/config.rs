//! Resolved runtime settings.
//!
//! [`GlobalArgs`](crate::cli::GlobalArgs) is what the user typed (or set in
//! the environment); [`Settings`] is the checked view the commands work from.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::GlobalArgs;
use crate::grid::{AxisOrder, WeekStart, DEFAULT_WEEKS, MAX_WEEKS};
use crate::schedule::PushPolicy;

/// Default timeout for a single git invocation, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Checked settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Working tree that receives the commits.
    pub repo_path: PathBuf,
    /// Log file, relative to `repo_path` unless absolute.
    pub data_file: PathBuf,
    /// Weekday of grid row 0.
    pub week_start: WeekStart,
    /// Orientation of pattern files.
    pub axis: AxisOrder,
    /// Width of the grid in weeks.
    pub weeks: u32,
    /// Limit on each git invocation.
    pub timeout: Duration,
    /// Remote used for pushes.
    pub remote: String,
    /// Seed for reproducible random schedules.
    pub seed: Option<u64>,
    /// Suppress every push.
    pub no_push: bool,
    /// Preview only.
    pub dry_run: bool,
    /// Debug logging.
    pub verbose: bool,
    /// Warnings and errors only.
    pub quiet: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("."),
            data_file: PathBuf::from("data.json"),
            week_start: WeekStart::default(),
            axis: AxisOrder::default(),
            weeks: DEFAULT_WEEKS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            remote: "origin".to_string(),
            seed: None,
            no_push: false,
            dry_run: false,
            verbose: false,
            quiet: false,
        }
    }
}

impl Settings {
    /// Validates parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a grid narrower than one week or wider
    /// than [`MAX_WEEKS`], a zero timeout, an empty data file name or an
    /// empty remote name.
    pub fn from_args(args: &GlobalArgs) -> Result<Self, ConfigError> {
        if args.weeks == 0 {
            return Err(ConfigError::ZeroWeeks);
        }
        if args.weeks > MAX_WEEKS {
            return Err(ConfigError::TooManyWeeks {
                weeks: args.weeks,
                max: MAX_WEEKS,
            });
        }
        if args.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if args.data_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataFile);
        }
        if args.remote.trim().is_empty() {
            return Err(ConfigError::EmptyRemote);
        }
        Ok(Self {
            repo_path: args.repo_path.clone(),
            data_file: args.data_file.clone(),
            week_start: args.week_start,
            axis: args.axis,
            weeks: args.weeks,
            timeout: Duration::from_secs(args.timeout_secs),
            remote: args.remote.trim().to_string(),
            seed: args.seed,
            no_push: args.no_push,
            dry_run: args.dry_run,
            verbose: args.verbose,
            quiet: args.quiet,
        })
    }

    /// Where the log file lives on disk.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.repo_path.join(&self.data_file)
    }

    /// The policy to use given a command's default.
    #[must_use]
    pub fn push_policy(&self, default: PushPolicy) -> PushPolicy {
        if self.no_push {
            PushPolicy::None
        } else {
            default
        }
    }

    /// Log level implied by `--verbose` and `--quiet`.
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Invalid settings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `--weeks 0`.
    #[error("--weeks must be at least 1")]
    ZeroWeeks,

    /// `--weeks` past [`MAX_WEEKS`].
    #[error("--weeks {weeks} is more than the supported {max}")]
    TooManyWeeks {
        /// The rejected width.
        weeks: u32,
        /// Widest accepted window.
        max: u32,
    },

    /// `--timeout-secs 0`.
    #[error("--timeout-secs must be at least 1")]
    ZeroTimeout,

    /// `--data-file ""`.
    #[error("--data-file must not be empty")]
    EmptyDataFile,

    /// `--remote ""`.
    #[error("--remote must not be empty")]
    EmptyRemote,
}
