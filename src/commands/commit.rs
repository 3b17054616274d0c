//! `gridstamp commit <x> <y>` command.

use super::{execute_plan, mapper};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::grid::GridCoordinate;
use crate::schedule::PushPolicy;

/// Execute the `commit` command: one commit at a single cell, pushed.
///
/// # Errors
///
/// Returns an error string if the cell is invalid, lies in the future or
/// outside the window, or the repository cannot be used. A window that
/// cannot be placed on the calendar is reported the same way.
pub fn run(ctx: &ServiceContext, settings: &Settings, x: u32, y: u32) -> Result<(), String> {
    let coordinate = GridCoordinate::new(x, y)
        .ok_or_else(|| format!("day {y} is not between 0 and 6"))?;
    let mapper = mapper(ctx, settings);
    let plan = mapper.plan(&[coordinate]).map_err(|e| e.to_string())?;
    if plan.requests.is_empty() {
        let window = mapper.window(ctx.clock.now()).map_err(|e| e.to_string())?;
        let weeks = settings.weeks;
        if !window.contains(coordinate) {
            return Err(format!("cell {coordinate} is outside the {weeks}-week window"));
        }
        return Err(match window.resolve(coordinate) {
            Ok(when) => format!("cell {coordinate} falls on {when}, which is in the future"),
            Err(e) => e.to_string(),
        });
    }
    execute_plan(ctx, settings, &plan, PushPolicy::AfterEach)
}
