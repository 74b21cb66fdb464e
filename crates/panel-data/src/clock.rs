//! Calendar source for date defaults

use chrono::NaiveDate;

/// Provides "today" for fields that default to the current date
pub trait Clock: Send + Sync + 'static {
    /// Current local calendar date
    fn today(&self) -> NaiveDate;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Always the same date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
