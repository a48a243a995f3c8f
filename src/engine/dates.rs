// src/engine/dates.rs

//! Calendar-day arithmetic used by the engine.
//!
//! Everything here is plain day counting: no weekends, holidays or time
//! zones.

use chrono::{Days, NaiveDate, TimeDelta};

/// The earliest day a dependent may start once its prerequisite is due on
/// `due`. `None` only at the end of the representable calendar.
pub fn day_after(due: NaiveDate) -> Option<NaiveDate> {
    due.checked_add_days(Days::new(1))
}

/// Signed distance from `start` to `due`.
pub fn span(start: NaiveDate, due: NaiveDate) -> TimeDelta {
    due.signed_duration_since(start)
}

/// Move a `[start, due]` window so that it begins on `new_start`, keeping
/// its length. Malformed windows (due before start) keep their negative
/// length as well.
pub fn move_window(
    start: NaiveDate,
    due: NaiveDate,
    new_start: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let new_due = new_start.checked_add_signed(span(start, due))?;
    Some((new_start, new_due))
}
