//! Bitmap font for writing text onto the grid.
//!
//! Each glyph is seven rows tall, one row per day, and five to seven columns
//! wide. `#` marks a lit cell.

use super::{Pattern, DAYS_PER_WEEK};

type Glyph = [&'static str; DAYS_PER_WEEK as usize];

/// Columns used by a character the font has no bitmap for.
const FALLBACK_WIDTH: usize = 4;

/// Blank columns placed between adjacent glyphs.
const GAP: usize = 1;

#[rustfmt::skip]
const fn glyph(c: char) -> Option<Glyph> {
    let rows = match c {
        'A' => [".###.", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"],
        'B' => ["####.", "#...#", "#...#", "####.", "#...#", "#...#", "####."],
        'C' => [".###.", "#...#", "#....", "#....", "#....", "#...#", ".###."],
        'D' => ["####.", "#...#", "#...#", "#...#", "#...#", "#...#", "####."],
        'E' => ["#####", "#....", "#....", "####.", "#....", "#....", "#####"],
        'F' => ["#####", "#....", "#....", "####.", "#....", "#....", "#...."],
        'G' => [".###.", "#...#", "#....", "#.###", "#...#", "#...#", ".###."],
        'H' => ["#...#", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"],
        'I' => ["#####", "..#..", "..#..", "..#..", "..#..", "..#..", "#####"],
        'J' => ["..###", "...#.", "...#.", "...#.", "...#.", "#..#.", ".##.."],
        'K' => ["#...#", "#..#.", "#.#..", "##...", "#.#..", "#..#.", "#...#"],
        'L' => ["#....", "#....", "#....", "#....", "#....", "#....", "#####"],
        'M' => ["#.....#", "##...##", "#.#.#.#", "#..#..#", "#.....#", "#.....#", "#.....#"],
        'N' => ["#...#", "##..#", "#.#.#", "#..##", "#...#", "#...#", "#...#"],
        'O' => [".###.", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."],
        'P' => ["####.", "#...#", "#...#", "####.", "#....", "#....", "#...."],
        'Q' => [".###.", "#...#", "#...#", "#...#", "#.#.#", "#..#.", ".##.#"],
        'R' => ["####.", "#...#", "#...#", "####.", "#.#..", "#..#.", "#...#"],
        'S' => [".####", "#....", "#....", ".###.", "....#", "....#", "####."],
        'T' => ["#####", "..#..", "..#..", "..#..", "..#..", "..#..", "..#.."],
        'U' => ["#...#", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."],
        'V' => ["#...#", "#...#", "#...#", "#...#", "#...#", ".#.#.", "..#.."],
        'W' => ["#.....#", "#.....#", "#.....#", "#..#..#", "#.#.#.#", "##...##", "#.....#"],
        'X' => ["#...#", "#...#", ".#.#.", "..#..", ".#.#.", "#...#", "#...#"],
        'Y' => ["#...#", "#...#", ".#.#.", "..#..", "..#..", "..#..", "..#.."],
        'Z' => ["#####", "....#", "...#.", "..#..", ".#...", "#....", "#####"],
        ' ' => [".....", ".....", ".....", ".....", ".....", ".....", "....."],
        '!' => ["..#..", "..#..", "..#..", "..#..", "..#..", ".....", "..#.."],
        '?' => [".###.", "#...#", "....#", "...#.", "..#..", ".....", "..#.."],
        '♥' => [".##.##.", "#######", "#######", ".#####.", "..###..", "...#...", "......."],
        _ => return None,
    };
    Some(rows)
}

/// Uppercases `c` when its uppercase form is a single character.
///
/// `'ß'` uppercases to `"SS"` and is left alone rather than drawn as `S`.
fn single_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Column-major cells for one character, blank columns for unknown ones.
fn columns_for(c: char) -> Vec<[u32; DAYS_PER_WEEK as usize]> {
    let Some(rows) = glyph(single_uppercase(c)) else {
        return vec![[0; DAYS_PER_WEEK as usize]; FALLBACK_WIDTH];
    };
    let width = rows[0].len();
    (0..width)
        .map(|col| {
            let mut column = [0; DAYS_PER_WEEK as usize];
            for (day, row) in rows.iter().enumerate() {
                column[day] = u32::from(row.as_bytes()[col] == b'#');
            }
            column
        })
        .collect()
}

/// Renders `text` as a pattern no wider than `max_width` columns.
///
/// Glyphs are placed left to right with a one-column gap. A glyph that would
/// cross `max_width` is dropped along with everything after it, so the head
/// of the text always survives. Lowercase letters render as uppercase.
#[must_use]
pub fn text_to_pattern(text: &str, max_width: usize) -> Pattern {
    let mut columns: Vec<[u32; DAYS_PER_WEEK as usize]> = Vec::new();
    for c in text.chars() {
        let glyph = columns_for(c);
        let gap = if columns.is_empty() { 0 } else { GAP };
        if columns.len() + gap + glyph.len() > max_width {
            tracing::debug!(character = %c, max_width, "text truncated");
            break;
        }
        let blank = [0; DAYS_PER_WEEK as usize];
        columns.extend(std::iter::repeat(blank).take(gap));
        columns.extend(glyph);
    }
    Pattern::from_columns(&columns)
}
