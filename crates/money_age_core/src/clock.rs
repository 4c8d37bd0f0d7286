//! Source of "today" for age reads
//!
//! Pool ages drift with the calendar: every age is recomputed against the
//! clock at read time. Production code uses [`SystemClock`]; tests and
//! replays pin the date with [`FixedClock`].

use std::fmt::Debug;

use jiff::civil::Date;

pub trait Clock: Debug + Send + Sync {
    fn today(&self) -> Date;
}

/// Local calendar date from the system time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        jiff::Zoned::now().date()
    }
}

/// A clock that always reports the same date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}
