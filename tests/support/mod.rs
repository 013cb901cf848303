//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{NaiveDate, NaiveDateTime};
use downonly_core::clock::ManualClock;
use downonly_core::state::{Configuration, LogBook, SharedState, Statistics};
use downonly_core::{StopReason, TransferObserver};

/// Observer that counts bytes and stops on demand.
#[derive(Debug, Default)]
pub struct CountingObserver {
    pub bytes: AtomicU64,
    pub stop: AtomicBool,
    /// Stop once this many bytes were recorded (0 = never).
    pub stop_after: u64,
}

impl CountingObserver {
    pub fn stopping_after(bytes: u64) -> Self {
        Self {
            stop_after: bytes,
            ..Self::default()
        }
    }

    pub fn total(&self) -> u64 {
        self.bytes.load(Ordering::SeqCst)
    }
}

impl TransferObserver for CountingObserver {
    fn should_stop(&self) -> Option<StopReason> {
        let limit_hit = self.stop_after > 0 && self.total() >= self.stop_after;
        (self.stop.load(Ordering::SeqCst) || limit_hit).then_some(StopReason::Disabled)
    }

    fn record(&self, bytes: u64) {
        self.bytes.fetch_add(bytes, Ordering::SeqCst);
    }
}

/// Noon on a fixed day.
pub fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Shared state at [`noon`] with a manual clock.
pub fn shared_state(config: Configuration) -> (Arc<ManualClock>, Arc<SharedState>) {
    let clock = Arc::new(ManualClock::new(noon()));
    let state = Arc::new(SharedState::new(
        config,
        Statistics::starting(noon().date()),
        LogBook::default(),
        clock.clone(),
    ));
    (clock, state)
}
