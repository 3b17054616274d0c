//! Calendar grid mapping.
//!
//! A contribution graph is a grid of `weeks × 7` cells. This module turns
//! cells, patterns and text into concrete commit timestamps. Everything in
//! here is pure; the current time and random draws come in through the
//! [`Clock`](crate::ports::Clock) and [`RandomSource`](crate::ports::RandomSource)
//! ports held by [`GridMapper`].
//!
//! Conventions:
//! - `day` 0 is the configured start-of-week day ([`WeekStart`]).
//! - `week` 0 is the oldest column of the window; the week axis is never mirrored.
//! - Internally a [`Pattern`] is always day-major (`rows = days`).

pub mod calendar;
pub mod glyphs;
pub mod mapper;
pub mod pattern;
pub mod preview;
pub mod random;

use std::fmt;

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

pub use calendar::{compute_window_anchor, is_future, resolve_coordinate, CalendarError};
pub use glyphs::text_to_pattern;
pub use mapper::{plan_requests, yesterday_request, GridMapper, Plan};
pub use pattern::{pattern_to_schedule, Pattern, PatternError, Preset};
pub use preview::render_preview;
pub use random::{generate_random_schedule, scatter_schedule, FillOptions};

/// Number of day rows in a contribution graph.
pub const DAYS_PER_WEEK: u32 = 7;

/// Default width of the window in weeks.
pub const DEFAULT_WEEKS: u32 = 52;

/// Widest window accepted from configuration, ten years of columns.
pub const MAX_WEEKS: u32 = 520;

/// Most commits accepted on a single cell.
pub const MAX_COMMITS_PER_DAY: u32 = 100;

/// Most cells the `random` command draws in one run.
pub const MAX_RANDOM_COUNT: u32 = 10_000;

/// Rendering used for commit timestamps, log entries and git date overrides.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed prefix of every generated commit message.
///
/// Doubles as the key used to find generated commits again.
pub const COMMIT_MESSAGE_PREFIX: &str = "Commit for ";

/// Which weekday sits in row 0 of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// Sunday-first, as GitHub draws its graph.
    #[default]
    Sunday,
    /// Monday-first (ISO week).
    Monday,
}

impl WeekStart {
    /// The weekday of row 0.
    #[must_use]
    pub fn weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
        }
    }

    /// The weekday of row `day` (taken modulo 7).
    #[must_use]
    pub fn weekday_of_row(self, day: u32) -> Weekday {
        let mut weekday = self.weekday();
        for _ in 0..day % DAYS_PER_WEEK {
            weekday = weekday.succ();
        }
        weekday
    }
}

/// How the two axes of a pattern file are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AxisOrder {
    /// `pattern[day][week]`: each row is one weekday.
    #[default]
    DayMajor,
    /// `pattern[week][day]`: each row is one week column.
    WeekMajor,
}

/// One cell of the contribution graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoordinate {
    /// Column, counted from the oldest week of the window.
    pub week: u32,
    /// Row, counted from the start-of-week day. Always `< 7`.
    pub day: u32,
}

impl GridCoordinate {
    /// Creates a coordinate, or `None` when `day` is not a valid row.
    #[must_use]
    pub fn new(week: u32, day: u32) -> Option<Self> {
        (day < DAYS_PER_WEEK).then_some(Self { week, day })
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.week, self.day)
    }
}

/// The span of calendar time covered by the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Timestamp of cell `(0, 0)`; always falls on the start-of-week day.
    pub anchor: NaiveDateTime,
    /// Number of week columns.
    pub weeks: u32,
}

impl TimeWindow {
    /// Returns `true` when the coordinate lies inside the window's bounds.
    #[must_use]
    pub fn contains(&self, coordinate: GridCoordinate) -> bool {
        coordinate.week < self.weeks && coordinate.day < DAYS_PER_WEEK
    }

    /// Resolves a coordinate against this window's anchor.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::CellOutOfRange`] when the cell lies past the
    /// latest representable date.
    pub fn resolve(&self, coordinate: GridCoordinate) -> Result<NaiveDateTime, CalendarError> {
        resolve_coordinate(self.anchor, coordinate)
    }
}

/// A request for one backdated commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    /// The cell this commit paints, if it was produced from the grid.
    pub coordinate: Option<GridCoordinate>,
    /// Author and committer date of the commit.
    pub timestamp: NaiveDateTime,
    /// Commit message; always `COMMIT_MESSAGE_PREFIX` plus the timestamp.
    pub message: String,
}

impl CommitRequest {
    /// Creates a request, deriving the message from the timestamp.
    #[must_use]
    pub fn new(coordinate: Option<GridCoordinate>, timestamp: NaiveDateTime) -> Self {
        let message = format!("{COMMIT_MESSAGE_PREFIX}{}", format_timestamp(timestamp));
        Self {
            coordinate,
            timestamp,
            message,
        }
    }
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS`.
#[must_use]
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}
