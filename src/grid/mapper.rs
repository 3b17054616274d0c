//! Turning grid cells into concrete commit requests.

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use super::{
    compute_window_anchor, generate_random_schedule, is_future, scatter_schedule, CalendarError,
    CommitRequest, FillOptions, GridCoordinate, TimeWindow, WeekStart,
};
use crate::ports::{Clock, RandomSource};

/// Requests that survived future filtering, plus how many did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Requests in schedule order.
    pub requests: Vec<CommitRequest>,
    /// Cells dropped because they resolved after `now` or fell outside the window.
    pub skipped: usize,
}

impl Plan {
    /// Coordinates of the planned requests, for previews.
    #[must_use]
    pub fn coordinates(&self) -> Vec<GridCoordinate> {
        self.requests.iter().filter_map(|r| r.coordinate).collect()
    }
}

/// Resolves `coordinates` against `window`, dropping future and
/// out-of-window cells.
///
/// A cell that resolves past the end of the calendar is later than any
/// `now`, so it is skipped as a future cell.
#[must_use]
pub fn plan_requests(
    window: &TimeWindow,
    now: NaiveDateTime,
    coordinates: &[GridCoordinate],
) -> Plan {
    let mut plan = Plan::default();
    for &coordinate in coordinates {
        if !window.contains(coordinate) {
            debug!(%coordinate, "outside window, skipped");
            plan.skipped += 1;
            continue;
        }
        let Ok(timestamp) = window.resolve(coordinate) else {
            debug!(%coordinate, "past the calendar, skipped");
            plan.skipped += 1;
            continue;
        };
        if is_future(timestamp, now) {
            debug!(%coordinate, %timestamp, "future cell, skipped");
            plan.skipped += 1;
            continue;
        }
        let request = CommitRequest::new(Some(coordinate), timestamp);
        plan.requests.push(request);
    }
    plan
}

/// A single request dated exactly one day before `now`.
#[must_use]
pub fn yesterday_request(now: NaiveDateTime) -> CommitRequest {
    CommitRequest::new(None, now - Duration::days(1))
}

/// Calendar grid mapper bound to an injected clock and random source.
///
/// The clock is read once per call, so every request in a plan shares the
/// same notion of `now`.
pub struct GridMapper<'a> {
    clock: &'a dyn Clock,
    random: &'a dyn RandomSource,
    week_start: WeekStart,
    weeks: u32,
}

impl<'a> GridMapper<'a> {
    /// Creates a mapper over a window of `weeks` columns.
    #[must_use]
    pub fn new(
        clock: &'a dyn Clock,
        random: &'a dyn RandomSource,
        week_start: WeekStart,
        weeks: u32,
    ) -> Self {
        Self {
            clock,
            random,
            week_start,
            weeks,
        }
    }

    /// Number of week columns.
    #[must_use]
    pub fn weeks(&self) -> u32 {
        self.weeks
    }

    /// Start-of-week day of row 0.
    #[must_use]
    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// The window whose last column contains `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::AnchorOutOfRange`] when the window reaches
    /// back past the earliest representable date.
    pub fn window(&self, now: NaiveDateTime) -> Result<TimeWindow, CalendarError> {
        // The anchor sits `weeks - 1` weeks back so that `now` lands in the
        // final column rather than one past it.
        let anchor = compute_window_anchor(self.weeks.saturating_sub(1), now, self.week_start)?;
        Ok(TimeWindow {
            anchor,
            weeks: self.weeks,
        })
    }

    /// Resolves coordinates into requests against the current time.
    ///
    /// # Errors
    ///
    /// Fails when the window itself cannot be placed on the calendar.
    pub fn plan(&self, coordinates: &[GridCoordinate]) -> Result<Plan, CalendarError> {
        let now = self.clock.now();
        let plan = plan_requests(&self.window(now)?, now, coordinates);
        debug!(planned = plan.requests.len(), skipped = plan.skipped, %now, "planned requests");
        Ok(plan)
    }

    /// Randomized fill over the window.
    ///
    /// # Errors
    ///
    /// Fails when the window itself cannot be placed on the calendar.
    pub fn random_fill(&self, options: &FillOptions) -> Result<Plan, CalendarError> {
        let options = FillOptions {
            weeks: options.weeks.min(self.weeks),
            week_start: self.week_start,
            ..options.clone()
        };
        self.plan(&generate_random_schedule(&options, self.random))
    }

    /// `count` cells drawn uniformly over the window.
    ///
    /// # Errors
    ///
    /// Fails when the window itself cannot be placed on the calendar.
    pub fn scatter(&self, count: u32) -> Result<Plan, CalendarError> {
        self.plan(&scatter_schedule(count, self.weeks, self.random))
    }

    /// One request for this time yesterday.
    #[must_use]
    pub fn yesterday(&self) -> CommitRequest {
        yesterday_request(self.clock.now())
    }
}
