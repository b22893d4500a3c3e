//! Wall-clock source
//!
//! "Today" drives past-date flags, tomorrow's default reservation date and
//! elapsed time slots, so it is injected rather than read ambiently.

use chrono::{Local, NaiveDate, NaiveDateTime};

/// Source of the shop's local date and time
pub trait Clock: Send + Sync {
    /// Current local date-time
    fn now(&self) -> NaiveDateTime;

    /// Current local date
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Host clock in the machine's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    #[must_use]
    pub fn at(now: NaiveDateTime) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
