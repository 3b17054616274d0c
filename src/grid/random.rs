//! Randomized schedule generators.

use chrono::Weekday;

use super::{GridCoordinate, WeekStart, DAYS_PER_WEEK};
use crate::ports::RandomSource;

/// Parameters for filling the grid with randomized activity.
#[derive(Debug, Clone, PartialEq)]
pub struct FillOptions {
    /// Number of week columns to enumerate.
    pub weeks: u32,
    /// Number of day rows per week (at most 7).
    pub days_per_week: u32,
    /// Smallest number of commits on an active cell.
    pub min_count: u32,
    /// Largest number of commits on an active cell.
    pub max_count: u32,
    /// Probability that a cell is active, in `[0, 1]`.
    pub frequency: f64,
    /// Multiplier applied to `frequency` on Saturdays and Sundays.
    pub weekend_dampening: Option<f64>,
    /// Weekday of row 0, used to classify weekend rows.
    pub week_start: WeekStart,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            weeks: super::DEFAULT_WEEKS,
            days_per_week: DAYS_PER_WEEK,
            min_count: 0,
            max_count: 3,
            frequency: 0.7,
            weekend_dampening: None,
            week_start: WeekStart::default(),
        }
    }
}

impl FillOptions {
    fn probability(&self, day: u32) -> f64 {
        let weekend = matches!(
            self.week_start.weekday_of_row(day),
            Weekday::Sat | Weekday::Sun
        );
        let p = match self.weekend_dampening {
            Some(factor) if weekend => self.frequency * factor,
            _ => self.frequency,
        };
        p.clamp(0.0, 1.0)
    }
}

/// Enumerates every cell (weeks ascending, then days ascending) and, with
/// the cell's probability, emits it `count` times where `count` is drawn
/// uniformly from `[min_count, max_count]`.
///
/// Every cell consumes exactly one Bernoulli draw, and every active cell
/// one count draw, so a replayed random source reproduces the schedule.
pub fn generate_random_schedule(
    options: &FillOptions,
    random: &dyn RandomSource,
) -> Vec<GridCoordinate> {
    let days = options.days_per_week.min(DAYS_PER_WEEK);
    let (low, high) = if options.min_count <= options.max_count {
        (options.min_count, options.max_count)
    } else {
        (options.max_count, options.min_count)
    };

    let mut schedule = Vec::new();
    for week in 0..options.weeks {
        for day in 0..days {
            if random.unit() < options.probability(day) {
                let count = random.between(low, high);
                let coordinate = GridCoordinate { week, day };
                let copies = std::iter::repeat(coordinate).take(count as usize);
                schedule.extend(copies);
            }
        }
    }
    schedule
}

/// Draws `count` cells uniformly over a `weeks × 7` grid.
pub fn scatter_schedule(count: u32, weeks: u32, random: &dyn RandomSource) -> Vec<GridCoordinate> {
    if weeks == 0 {
        return Vec::new();
    }
    (0..count)
        .map(|_| {
            let week = random.between(0, weeks - 1);
            let day = random.between(0, DAYS_PER_WEEK - 1);
            GridCoordinate { week, day }
        })
        .collect()
}
