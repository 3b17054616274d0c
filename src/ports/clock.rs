//! Clock port for obtaining the current time.

use chrono::NaiveDateTime;

/// Provides the current local wall-clock time.
///
/// Backdated commits are stamped with naive local timestamps (git reads
/// `GIT_AUTHOR_DATE` in the local zone), so the clock speaks the same
/// language. Substituting a fixed or recorded clock makes every schedule
/// reproducible.
pub trait Clock: Send + Sync {
    /// Returns the current local date and time.
    fn now(&self) -> NaiveDateTime;
}
