//! `gridstamp fill` command.

use super::{execute_plan, mapper};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::grid::{FillOptions, DAYS_PER_WEEK};
use crate::schedule::PushPolicy;

/// Fill options from the command line and the configured grid.
#[must_use]
pub fn options(
    settings: &Settings,
    min_count: u32,
    max_count: u32,
    frequency: f64,
    weekend_dampening: Option<f64>,
) -> FillOptions {
    FillOptions {
        weeks: settings.weeks,
        days_per_week: DAYS_PER_WEEK,
        min_count,
        max_count,
        frequency,
        weekend_dampening,
        week_start: settings.week_start,
    }
}

/// Execute the `fill` command: randomized activity over the whole window.
///
/// # Errors
///
/// Returns an error string if the window cannot be placed on the calendar
/// or the repository cannot be used.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    options: &FillOptions,
) -> Result<(), String> {
    let plan = mapper(ctx, settings)
        .random_fill(options)
        .map_err(|e| e.to_string())?;
    execute_plan(ctx, settings, &plan, PushPolicy::AfterAll)
}
