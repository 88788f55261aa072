//! Wall-clock access, injectable so day rollover and tap timing can be
//! simulated deterministically.
use chrono::{Local, NaiveDate};
use std::cell::Cell;
use std::rc::Rc;

use crate::constants::PLAY_DATE_FORMAT;

pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;

    /// The current local calendar date.
    fn today(&self) -> NaiveDate;
}

/// The host's real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(Local::now().timestamp_millis()).unwrap_or(0)
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A hand-driven clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Rc<Cell<u64>>,
    date: Rc<Cell<NaiveDate>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(date: NaiveDate, millis: u64) -> Self {
        Self {
            millis: Rc::new(Cell::new(millis)),
            date: Rc::new(Cell::new(date)),
        }
    }

    pub fn set_millis(&self, millis: u64) {
        self.millis.set(millis);
    }

    pub fn advance_millis(&self, delta: u64) {
        self.millis.set(self.millis.get().saturating_add(delta));
    }

    pub fn set_today(&self, date: NaiveDate) {
        self.date.set(date);
    }

    /// Move the calendar forward one day.
    pub fn next_day(&self) {
        if let Some(next) = self.date.get().succ_opt() {
            self.date.set(next);
        }
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.millis.get()
    }

    fn today(&self) -> NaiveDate {
        self.date.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Format a date the way saves record `lastPlayDate`, e.g. `Sun Oct 18 2026`.
#[must_use]
pub fn play_date_string(date: NaiveDate) -> String {
    date.format(PLAY_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_date_matches_saved_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(play_date_string(date), "Sun Oct 18 2026");
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(play_date_string(date), "Sun Jan 05 2025");
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(NaiveDate::from_ymd_opt(2026, 2, 17).unwrap(), 0);
        let other = clock.clone();
        clock.advance_millis(1_500);
        clock.next_day();
        assert_eq!(other.now_millis(), 1_500);
        assert_eq!(other.today(), NaiveDate::from_ymd_opt(2026, 2, 18).unwrap());
    }
}
