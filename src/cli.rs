//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::grid::{
    AxisOrder, Preset, WeekStart, DEFAULT_WEEKS, MAX_COMMITS_PER_DAY, MAX_RANDOM_COUNT,
};

/// Top-level CLI parser for `gridstamp`.
#[derive(Debug, Parser)]
#[command(
    name = "gridstamp",
    version,
    about = "Draw on a contribution graph with backdated commits"
)]
pub struct Cli {
    /// Options shared by every command.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Options accepted before or after any subcommand.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Git working tree that receives the commits
    #[arg(long, global = true, env = "GRIDSTAMP_REPO_PATH", default_value = ".")]
    pub repo_path: PathBuf,

    /// JSON log file, relative to the repository
    #[arg(
        long,
        global = true,
        env = "GRIDSTAMP_DATA_FILE",
        default_value = "data.json"
    )]
    pub data_file: PathBuf,

    /// Weekday shown in the top row of the graph
    #[arg(
        long,
        global = true,
        env = "GRIDSTAMP_WEEK_START",
        value_enum,
        default_value_t = WeekStart::Sunday
    )]
    pub week_start: WeekStart,

    /// Orientation of pattern files
    #[arg(
        long,
        global = true,
        env = "GRIDSTAMP_AXIS",
        value_enum,
        default_value_t = AxisOrder::DayMajor
    )]
    pub axis: AxisOrder,

    /// Width of the graph in weeks
    #[arg(long, global = true, env = "GRIDSTAMP_WEEKS", default_value_t = DEFAULT_WEEKS)]
    pub weeks: u32,

    /// Seconds before a git invocation is abandoned
    #[arg(
        long,
        global = true,
        env = "GRIDSTAMP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub timeout_secs: u64,

    /// Remote to push to
    #[arg(long, global = true, env = "GRIDSTAMP_REMOTE", default_value = "origin")]
    pub remote: String,

    /// Seed for reproducible random schedules
    #[arg(long, global = true, env = "GRIDSTAMP_SEED")]
    pub seed: Option<u64>,

    /// Never push, whatever the command's default
    #[arg(long, global = true)]
    pub no_push: bool,

    /// Print the planned schedule without touching the repository or log
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Make one commit dated this time yesterday.
    Yesterday,
    /// Make one commit at a single cell (pushes by default).
    Commit {
        /// Week column, 0 is the oldest.
        x: u32,
        /// Day row, 0 is the start-of-week day.
        #[arg(value_parser = clap::value_parser!(u32).range(0..7))]
        y: u32,
    },
    /// Scatter commits over random cells.
    Random {
        /// Number of cells to draw.
        #[arg(long, default_value_t = 100, value_parser = count_parser(MAX_RANDOM_COUNT))]
        count: u32,
    },
    /// Fill every cell with a random number of commits.
    Fill {
        /// Fewest commits on an active day.
        #[arg(long, default_value_t = 0, value_parser = count_parser(MAX_COMMITS_PER_DAY))]
        min_commits: u32,
        /// Most commits on an active day.
        #[arg(long, default_value_t = 3, value_parser = count_parser(MAX_COMMITS_PER_DAY))]
        max_commits: u32,
        /// Chance that a day is active, 0.0 to 1.0.
        #[arg(long, default_value_t = 0.7, value_parser = parse_probability)]
        frequency: f64,
        /// Multiplier applied to the frequency on Saturdays and Sundays.
        #[arg(long, value_parser = parse_probability)]
        weekend_dampening: Option<f64>,
    },
    /// Draw a pattern read from a JSON file.
    Pattern {
        /// File holding an array of arrays of commit counts.
        file: PathBuf,
    },
    /// Draw a built-in shape.
    Preset {
        /// Which shape.
        #[arg(value_enum)]
        name: Preset,
        #[command(flatten)]
        placement: Placement,
    },
    /// Write text across the graph.
    Text {
        /// The text. Letters, space, `!`, `?` and `♥` are drawn.
        text: String,
        #[command(flatten)]
        placement: Placement,
    },
    /// Count generated commits in the repository.
    Stats,
    /// Discard every generated commit by resetting to before the oldest one.
    Revert {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
        /// Reset locally without force-pushing.
        #[arg(long)]
        no_force_push: bool,
    },
}

/// Where and how strongly a shape is drawn.
#[derive(Debug, Clone, Copy, Args)]
pub struct Placement {
    /// Empty weeks before the shape; must leave room inside the window.
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
    /// Commits per lit cell.
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_COMMITS_PER_DAY))
    )]
    pub intensity: u32,
}

fn count_parser(max: u32) -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(0..=i64::from(max))
}

fn parse_probability(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not between 0 and 1"))
    }
}
