//! Injectable wall clock.
//!
//! Collection windows are local times, so the clock deals in naive local
//! date-times. Reminder and rollover logic take a `&dyn Clock` so tests can
//! pin or advance time.

use std::sync::Mutex;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock pinned to a fixed instant, advanceable from tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Pin to `date` at `HH:MM` local time.
    ///
    /// # Panics
    ///
    /// Panics if `hour`/`minute` are out of range. Test helper.
    #[must_use]
    pub fn at(date: NaiveDate, hour: u32, minute: u32) -> Self {
        Self::new(
            date.and_hms_opt(hour, minute, 0)
                .expect("valid hour and minute"),
        )
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }

    pub fn set(&self, to: NaiveDateTime) {
        *self.now.lock().expect("clock lock") = to;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().expect("clock lock")
    }
}
