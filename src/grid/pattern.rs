//! Intensity patterns and their expansion into schedules.

use super::{AxisOrder, GridCoordinate, DAYS_PER_WEEK, MAX_COMMITS_PER_DAY};

/// Errors raised while validating pattern input.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// Input was not a JSON array of arrays of integers.
    #[error("invalid pattern JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Rows of different lengths.
    #[error("pattern is not rectangular: row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// A cell that is not a commit count in `0..=MAX_COMMITS_PER_DAY`.
    #[error("pattern cell [{row}][{col}] = {value} is not a commit count from 0 to {max}")]
    InvalidCount {
        /// Row index in the input.
        row: usize,
        /// Column index in the input.
        col: usize,
        /// The rejected value.
        value: i64,
        /// Largest accepted count.
        max: u32,
    },
}

/// A rectangular grid of per-cell commit counts, stored day-major:
/// `rows[day][week]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    rows: Vec<Vec<u32>>,
}

impl Pattern {
    /// Builds a pattern from day-major rows.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Ragged`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self, PatternError> {
        check_rectangular(&rows)?;
        Ok(Self { rows })
    }

    /// Builds a pattern from column slices, each holding one week's seven days.
    #[must_use]
    pub fn from_columns(columns: &[[u32; DAYS_PER_WEEK as usize]]) -> Self {
        if columns.is_empty() {
            return Self::default();
        }
        let rows = (0..DAYS_PER_WEEK as usize)
            .map(|day| columns.iter().map(|c| c[day]).collect())
            .collect();
        Self { rows }
    }

    /// Parses a JSON array of arrays of non-negative integers.
    ///
    /// With [`AxisOrder::WeekMajor`] the outer array indexes weeks and the
    /// input is transposed into day-major form.
    ///
    /// # Errors
    ///
    /// Rejects malformed JSON, non-integer cells, ragged rows and values
    /// outside `0..=MAX_COMMITS_PER_DAY`.
    pub fn from_json(text: &str, axis: AxisOrder) -> Result<Self, PatternError> {
        let raw: Vec<Vec<i64>> = serde_json::from_str(text)?;
        check_rectangular(&raw)?;

        let mut rows = Vec::with_capacity(raw.len());
        for (r, row) in raw.iter().enumerate() {
            let mut cells = Vec::with_capacity(row.len());
            for (c, &value) in row.iter().enumerate() {
                let count = u32::try_from(value)
                    .ok()
                    .filter(|&n| n <= MAX_COMMITS_PER_DAY)
                    .ok_or(PatternError::InvalidCount {
                        row: r,
                        col: c,
                        value,
                        max: MAX_COMMITS_PER_DAY,
                    })?;
                cells.push(count);
            }
            rows.push(cells);
        }

        let pattern = Self { rows };
        Ok(match axis {
            AxisOrder::DayMajor => pattern,
            AxisOrder::WeekMajor => pattern.transposed(),
        })
    }

    /// Number of day rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of week columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Returns `true` when the pattern has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() == 0
    }

    /// Day-major rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<u32>] {
        &self.rows
    }

    /// Count stored at `(day, week)`, zero outside the pattern.
    #[must_use]
    pub fn get(&self, day: usize, week: usize) -> u32 {
        self.rows
            .get(day)
            .and_then(|row| row.get(week))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all cells.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.rows.iter().flatten().map(|&n| u64::from(n)).sum()
    }

    /// Swaps the axes.
    #[must_use]
    pub fn transposed(&self) -> Self {
        let rows = (0..self.width())
            .map(|c| self.rows.iter().map(|row| row[c]).collect())
            .collect();
        Self { rows }
    }

    /// Prepends `weeks` empty columns.
    ///
    /// Allocates `weeks` cells per row; callers bound `weeks` by the window.
    #[must_use]
    pub fn shifted(&self, weeks: usize) -> Self {
        if self.is_empty() || weeks == 0 {
            return self.clone();
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let padding = std::iter::repeat(0).take(weeks);
                padding.chain(row.iter().copied()).collect()
            })
            .collect();
        Self { rows }
    }

    /// Multiplies every cell by `factor`, saturating.
    #[must_use]
    pub fn scaled(&self, factor: u32) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|row| row.iter().map(|n| n.saturating_mul(factor)).collect())
            .collect();
        Self { rows }
    }
}

fn check_rectangular<T>(rows: &[Vec<T>]) -> Result<(), PatternError> {
    let Some(expected) = rows.first().map(Vec::len) else {
        return Ok(());
    };
    match rows.iter().position(|row| row.len() != expected) {
        Some(row) => Err(PatternError::Ragged {
            row,
            expected,
            found: rows[row].len(),
        }),
        None => Ok(()),
    }
}

/// Expands a pattern into coordinates, day-major, repeating each cell by
/// its count.
///
/// Cells outside `weeks × 7` and zero cells are dropped silently.
#[must_use]
pub fn pattern_to_schedule(pattern: &Pattern, weeks: u32) -> Vec<GridCoordinate> {
    let mut schedule = Vec::new();
    for (day, row) in pattern.rows().iter().enumerate() {
        let Ok(day) = u32::try_from(day) else { break };
        if day >= DAYS_PER_WEEK {
            break;
        }
        for (week, &count) in row.iter().enumerate() {
            let Ok(week) = u32::try_from(week) else { break };
            if week >= weeks {
                break;
            }
            let copies = std::iter::repeat(GridCoordinate { week, day }).take(count as usize);
            schedule.extend(copies);
        }
    }
    schedule
}

/// Built-in shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// A 7×7 heart.
    Heart,
    /// A 7×7 smiling face.
    Smile,
    /// A 5-week plus sign.
    Cross,
}

const HEART: [[u32; 7]; 7] = [
    [0, 1, 1, 0, 1, 1, 0],
    [1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1],
    [0, 1, 1, 1, 1, 1, 0],
    [0, 0, 1, 1, 1, 0, 0],
    [0, 0, 0, 1, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0],
];

const SMILE: [[u32; 7]; 7] = [
    [0, 1, 1, 1, 1, 1, 0],
    [1, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 1, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 1],
    [0, 1, 1, 1, 1, 1, 0],
];

const CROSS: [[u32; 5]; 7] = [
    [0, 0, 1, 0, 0],
    [0, 0, 1, 0, 0],
    [1, 1, 1, 1, 1],
    [0, 0, 1, 0, 0],
    [0, 0, 1, 0, 0],
    [0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0],
];

impl Preset {
    /// The preset's day-major pattern.
    #[must_use]
    pub fn pattern(self) -> Pattern {
        let rows = match self {
            Self::Heart => HEART.iter().map(|r| r.to_vec()).collect(),
            Self::Smile => SMILE.iter().map(|r| r.to_vec()).collect(),
            Self::Cross => CROSS.iter().map(|r| r.to_vec()).collect(),
        };
        Pattern { rows }
    }
}
