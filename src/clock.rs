//! Wall-clock source for schedule and calendar-day decisions.
//!
//! Date rollover, schedule windows, log timestamps and uptime all read the
//! local wall clock through [`Clock`], so tests can pin the agent to any
//! instant with [`ManualClock`] instead of waiting on real time.
//!
//! Throttling does not go through this trait; it uses the monotonic
//! `tokio::time::Instant`.

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};
use parking_lot::Mutex;

/// Provides the current local date and time.
pub trait Clock: Send + Sync {
    /// Returns the current local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// [`Clock`] backed by the operating system's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable [`Clock`] for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}
