//! Day-count helpers for pool ages and forecast calendars.
//!
//! Ages are read constantly (every statistics call, every forecast day), so
//! the difference between two dates is computed from Rata Die day numbers
//! instead of going through `jiff::Span` normalisation.

use jiff::civil::Date;

/// Rata Die day number (days since 0001-01-01, proleptic Gregorian).
#[inline]
fn day_number(d: Date) -> i32 {
    let y = d.year() as i32;
    let m = d.month() as i32;
    let day = d.day() as i32;

    // March-based year so the leap day falls at the end
    let a = (14 - m) / 12;
    let y2 = y - a;
    let m2 = m + 12 * a - 3;

    day + (153 * m2 + 2) / 5 + 365 * y2 + y2 / 4 - y2 / 100 + y2 / 400 - 306
}

/// Signed number of days from `from` to `to`.
#[inline]
pub fn days_between(from: Date, to: Date) -> i32 {
    day_number(to) - day_number(from)
}

/// Whole days money created on `created` has been held as of `as_of`.
///
/// Income dated after `as_of` has not been held at all and reports 0.
#[inline]
pub fn age_in_days(created: Date, as_of: Date) -> u32 {
    days_between(created, as_of).max(0) as u32
}

/// Shift a date by `n` days, saturating at jiff's supported range.
pub fn add_days(d: Date, n: i32) -> Date {
    d.saturating_add(jiff::Span::new().days(i64::from(n)))
}
