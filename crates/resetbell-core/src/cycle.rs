//! Reset-cycle calendar model.
//!
//! Pure functions computing weekly-reset and weekend-window boundaries
//! relative to any civil instant. The weekly cycle is anchored at Monday at
//! the reset hour; the weekend window runs 48 hours from Saturday at the
//! reset hour to the following Monday at the reset hour.
//!
//! All functions are total and stateless: the result depends only on the
//! argument and the fixed reset hour.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::clock::RESET_HOUR;

/// Length of the weekend window.
const WEEKEND_WINDOW_HOURS: i64 = 48;

fn at_reset_hour(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(RESET_HOUR, 0, 0).expect("reset hour is a valid time"))
}

fn days_since(instant: NaiveDateTime, weekday: Weekday) -> i64 {
    let today = instant.date().weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    (today - target).rem_euclid(7)
}

fn days_until(instant: NaiveDateTime, weekday: Weekday) -> i64 {
    let today = instant.date().weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    (target - today).rem_euclid(7)
}

/// Saturday-at-reset-hour of the weekend window containing or most recently
/// preceding `instant`. Always at or before `instant`.
pub fn weekend_window_start_on_or_before(instant: NaiveDateTime) -> NaiveDateTime {
    let candidate =
        at_reset_hour(instant.date() - Duration::days(days_since(instant, Weekday::Sat)));
    if candidate > instant {
        // Saturday before the reset hour still belongs to the previous window.
        candidate - Duration::days(7)
    } else {
        candidate
    }
}

/// True iff `instant` falls inside the 48-hour weekend window
/// `[Saturday reset hour, next Monday reset hour)`.
pub fn is_within_weekend_window(instant: NaiveDateTime) -> bool {
    instant < weekend_window_start_on_or_before(instant) + Duration::hours(WEEKEND_WINDOW_HOURS)
}

/// Earliest instant at which the weekend grant is claimable: `instant` itself
/// when already inside a window, otherwise the next window start.
pub fn earliest_weekend_window_start(instant: NaiveDateTime) -> NaiveDateTime {
    if is_within_weekend_window(instant) {
        instant
    } else {
        next_weekend_window_start_after(instant)
    }
}

/// Next Monday-at-reset-hour on or after `instant`.
pub fn weekly_reset_on_or_after(instant: NaiveDateTime) -> NaiveDateTime {
    let candidate =
        at_reset_hour(instant.date() + Duration::days(days_until(instant, Weekday::Mon)));
    if instant <= candidate {
        candidate
    } else {
        candidate + Duration::days(7)
    }
}

/// Next reachable Saturday-at-reset-hour, inclusive when `instant` is at or
/// before this week's.
pub fn next_weekend_window_start_after(instant: NaiveDateTime) -> NaiveDateTime {
    let candidate =
        at_reset_hour(instant.date() + Duration::days(days_until(instant, Weekday::Sat)));
    if instant <= candidate {
        candidate
    } else {
        candidate + Duration::days(7)
    }
}
