//! Date arithmetic between grid cells and calendar timestamps.

use chrono::{Datelike, Duration, NaiveDateTime};

use super::{GridCoordinate, WeekStart, DAYS_PER_WEEK};

/// A grid date that chrono cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// The window reaches back past the earliest representable date.
    #[error("window of {weeks_back} week(s) before {now} starts before the supported calendar")]
    AnchorOutOfRange {
        /// Weeks the anchor was moved back.
        weeks_back: u32,
        /// The reference time.
        now: NaiveDateTime,
    },

    /// The cell lies past the latest representable date.
    #[error("cell {coordinate} resolves past the supported calendar")]
    CellOutOfRange {
        /// The cell that overflowed.
        coordinate: GridCoordinate,
    },
}

/// Computes the timestamp of cell `(0, 0)` for a window reaching
/// `weeks_back` weeks into the past.
///
/// `now` is moved back by `weeks_back` weeks and then rolled back 0–6 days
/// to the most recent `week_start` day. The time of day is kept, so every
/// cell of the window carries `now`'s clock time.
///
/// # Errors
///
/// Returns [`CalendarError::AnchorOutOfRange`] when the anchor would fall
/// before the earliest date chrono can represent.
pub fn compute_window_anchor(
    weeks_back: u32,
    now: NaiveDateTime,
    week_start: WeekStart,
) -> Result<NaiveDateTime, CalendarError> {
    let out_of_range = || CalendarError::AnchorOutOfRange { weeks_back, now };
    let shifted = now
        .checked_sub_signed(Duration::weeks(i64::from(weeks_back)))
        .ok_or_else(out_of_range)?;
    let from_monday = shifted.weekday().num_days_from_monday();
    let start_from_monday = week_start.weekday().num_days_from_monday();
    let roll_back = (from_monday + DAYS_PER_WEEK - start_from_monday) % DAYS_PER_WEEK;
    shifted
        .checked_sub_signed(Duration::days(i64::from(roll_back)))
        .ok_or_else(out_of_range)
}

/// Resolves a cell to `anchor + week weeks + day days`.
///
/// # Errors
///
/// Returns [`CalendarError::CellOutOfRange`] when the result would pass the
/// latest date chrono can represent.
pub fn resolve_coordinate(
    anchor: NaiveDateTime,
    coordinate: GridCoordinate,
) -> Result<NaiveDateTime, CalendarError> {
    anchor
        .checked_add_signed(Duration::weeks(i64::from(coordinate.week)))
        .and_then(|t| t.checked_add_signed(Duration::days(i64::from(coordinate.day))))
        .ok_or(CalendarError::CellOutOfRange { coordinate })
}

/// Returns `true` when `timestamp` is strictly after `now`.
///
/// Future cells are dropped by callers, never clamped.
#[must_use]
pub fn is_future(timestamp: NaiveDateTime, now: NaiveDateTime) -> bool {
    timestamp > now
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, Weekday};
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn anchor(weeks_back: u32, now: NaiveDateTime, week_start: WeekStart) -> NaiveDateTime {
        compute_window_anchor(weeks_back, now, week_start).unwrap()
    }

    fn resolve(anchor: NaiveDateTime, week: u32, day: u32) -> NaiveDateTime {
        resolve_coordinate(anchor, GridCoordinate { week, day }).unwrap()
    }

    #[test]
    fn anchor_on_a_sunday_stays_put() {
        // 2024-01-07 is a Sunday.
        let now = at(2024, 1, 7, 15, 30);
        assert_eq!(anchor(0, now, WeekStart::Sunday), now);
    }

    #[test]
    fn anchor_rolls_back_to_week_start() {
        // 2024-01-10 is a Wednesday.
        let now = at(2024, 1, 10, 8, 0);
        assert_eq!(anchor(0, now, WeekStart::Sunday), at(2024, 1, 7, 8, 0));
        assert_eq!(anchor(0, now, WeekStart::Monday), at(2024, 1, 8, 8, 0));
        assert_eq!(anchor(1, now, WeekStart::Monday), at(2024, 1, 1, 8, 0));
    }

    #[test]
    fn anchor_before_the_calendar_is_an_error() {
        let now = at(2024, 1, 10, 8, 0);
        let err = compute_window_anchor(u32::MAX, now, WeekStart::Sunday).unwrap_err();
        assert_eq!(
            err,
            CalendarError::AnchorOutOfRange {
                weeks_back: u32::MAX,
                now,
            }
        );
    }

    #[test]
    fn resolve_origin_and_offset() {
        let anchor = at(2024, 1, 7, 12, 0);
        assert_eq!(resolve(anchor, 0, 0), anchor);
        assert_eq!(resolve(anchor, 1, 2), anchor + Duration::days(9));
    }

    #[test]
    fn resolve_past_the_calendar_is_an_error() {
        let coordinate = GridCoordinate { week: 1, day: 0 };
        assert_eq!(
            resolve_coordinate(NaiveDateTime::MAX, coordinate),
            Err(CalendarError::CellOutOfRange { coordinate })
        );
    }

    #[test]
    fn future_is_strict() {
        let now = at(2024, 5, 1, 10, 0);
        assert!(!is_future(now, now));
        assert!(is_future(now + Duration::seconds(1), now));
        assert!(!is_future(now - Duration::days(1), now));
    }

    fn arb_now() -> impl Strategy<Value = NaiveDateTime> {
        // Roughly 2000-01-01 .. 2100-01-01 in seconds.
        (946_684_800_i64..4_102_444_800_i64)
            .prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap().naive_utc())
    }

    fn arb_week_start() -> impl Strategy<Value = WeekStart> {
        prop_oneof![Just(WeekStart::Sunday), Just(WeekStart::Monday)]
    }

    proptest! {
        #[test]
        fn anchor_is_aligned_and_not_after_now(
            weeks_back in 0u32..520,
            now in arb_now(),
            week_start in arb_week_start(),
        ) {
            let anchor = anchor(weeks_back, now, week_start);
            prop_assert_eq!(anchor.weekday(), week_start.weekday());
            prop_assert!(anchor <= now);
            prop_assert_eq!(anchor.time(), now.time());
            let expected_back = i64::from(weeks_back) * 7;
            let actual_back = (now.date() - anchor.date()).num_days();
            prop_assert!(actual_back >= expected_back && actual_back <= expected_back + 6);
        }

        #[test]
        fn resolved_cells_land_on_their_row_weekday(
            now in arb_now(),
            week in 0u32..53,
            day in 0u32..7,
            week_start in arb_week_start(),
        ) {
            let resolved = resolve(anchor(52, now, week_start), week, day);
            prop_assert_eq!(resolved.weekday(), week_start.weekday_of_row(day));
        }
    }

    #[test]
    fn monday_start_puts_sunday_last() {
        let anchor = anchor(0, at(2024, 1, 10, 0, 0), WeekStart::Monday);
        assert_eq!(resolve(anchor, 0, 6).weekday(), Weekday::Sun);
    }
}
