//! Text heat map of a schedule.

use std::fmt::Write as _;

use super::{GridCoordinate, WeekStart, DAYS_PER_WEEK};

const SHADES: [char; 5] = ['·', '░', '▒', '▓', '█'];

fn shade(count: u32) -> char {
    let index = usize::try_from(count)
        .unwrap_or(usize::MAX)
        .min(SHADES.len() - 1);
    SHADES[index]
}

/// Renders one labelled row per weekday and one column per week, shading
/// each cell by how many commits land on it.
///
/// Coordinates outside `weeks × 7` are left out of the drawing but still
/// counted in the total.
#[must_use]
pub fn render_preview(coordinates: &[GridCoordinate], weeks: u32, week_start: WeekStart) -> String {
    let width = weeks as usize;
    let mut counts = vec![vec![0u32; width]; DAYS_PER_WEEK as usize];
    for c in coordinates {
        let row = counts.get_mut(c.day as usize);
        if let Some(cell) = row.and_then(|row| row.get_mut(c.week as usize)) {
            *cell = cell.saturating_add(1);
        }
    }

    let mut out = String::new();
    for (day, row) in (0..DAYS_PER_WEEK).zip(&counts) {
        let _ = write!(out, "{} ", week_start.weekday_of_row(day));
        out.extend(row.iter().map(|&n| shade(n)));
        out.push('\n');
    }
    let _ = writeln!(out, "{} commits over {weeks} weeks", coordinates.len());
    out
}
