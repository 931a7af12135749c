//! Reference-timezone clock.
//!
//! All calendar math in this crate runs on civil timestamps in one fixed
//! reference timezone (UTC+9) with a fixed daily reset hour. Instants taken
//! from this module are never compared against timestamps from other offsets.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// Hour of day, reference timezone, at which recurring game state resets.
pub const RESET_HOUR: u32 = 6;

/// Offset of the reference timezone from UTC, in hours.
pub const REFERENCE_UTC_OFFSET_HOURS: i32 = 9;

/// Supplies the current civil instant in the reference timezone.
pub trait CalendarClock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Production clock: the wall clock converted into the reference timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl CalendarClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        to_reference(Utc::now())
    }
}

/// Convert a UTC instant into reference-timezone civil time.
pub fn to_reference(instant: DateTime<Utc>) -> NaiveDateTime {
    let offset = FixedOffset::east_opt(REFERENCE_UTC_OFFSET_HOURS * 3600)
        .expect("reference offset is in range");
    instant.with_timezone(&offset).naive_local()
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl CalendarClock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
