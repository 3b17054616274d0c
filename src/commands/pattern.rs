//! `gridstamp pattern`, `preset` and `text` commands.

use std::path::Path;

use tracing::warn;

use super::{execute_plan, mapper};
use crate::cli::Placement;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::grid::{pattern_to_schedule, text_to_pattern, Pattern, Preset};
use crate::schedule::PushPolicy;

/// Execute the `pattern` command with a JSON pattern file.
///
/// The file is validated in full before anything is scheduled.
///
/// # Errors
///
/// Returns an error string if the file cannot be read or is not a
/// rectangular array of commit counts.
pub fn run_file(ctx: &ServiceContext, settings: &Settings, file: &Path) -> Result<(), String> {
    let text = ctx
        .fs
        .read_to_string(file)
        .map_err(|e| format!("Failed to read pattern file {}: {e}", file.display()))?;
    let pattern = Pattern::from_json(&text, settings.axis)
        .map_err(|e| format!("Invalid pattern in {}: {e}", file.display()))?;
    draw(ctx, settings, &pattern)
}

/// Execute the `preset` command.
///
/// # Errors
///
/// Returns an error string if the offset leaves no room in the window or
/// the repository cannot be used.
pub fn run_preset(
    ctx: &ServiceContext,
    settings: &Settings,
    preset: Preset,
    placement: Placement,
) -> Result<(), String> {
    let pattern = place(&preset.pattern(), placement, settings.weeks)?;
    draw(ctx, settings, &pattern)
}

/// Execute the `text` command.
///
/// # Errors
///
/// Returns an error string if the offset leaves no room in the window or
/// the repository cannot be used.
pub fn run_text(
    ctx: &ServiceContext,
    settings: &Settings,
    text: &str,
    placement: Placement,
) -> Result<(), String> {
    let room = settings.weeks.saturating_sub(placement.offset) as usize;
    let pattern = text_to_pattern(text, room);
    if pattern.is_empty() && !text.is_empty() {
        warn!(text, room, "text does not fit in the window");
    }
    let pattern = place(&pattern, placement, settings.weeks)?;
    draw(ctx, settings, &pattern)
}

/// Scales `pattern` and shifts it right by the placement offset.
///
/// The offset must fall inside the `weeks`-wide window, which also bounds
/// the width of the shifted pattern.
fn place(pattern: &Pattern, placement: Placement, weeks: u32) -> Result<Pattern, String> {
    let offset = placement.offset;
    if offset >= weeks {
        return Err(format!("--offset {offset} leaves no room in the {weeks}-week window"));
    }
    let placed = pattern.scaled(placement.intensity).shifted(offset as usize);
    Ok(placed)
}

fn draw(ctx: &ServiceContext, settings: &Settings, pattern: &Pattern) -> Result<(), String> {
    let schedule = pattern_to_schedule(pattern, settings.weeks);
    let plan = mapper(ctx, settings)
        .plan(&schedule)
        .map_err(|e| e.to_string())?;
    execute_plan(ctx, settings, &plan, PushPolicy::AfterAll)
}
