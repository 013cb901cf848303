//! Sliding one-second throughput throttle.
//!
//! After each chunk the window computes how long its bytes *should* have
//! taken at the configured rate and sleeps off the difference. The window
//! restarts once a full second has passed, so a slow stretch never earns a
//! burst credit beyond one second.

use std::time::Duration;

use tokio::time::Instant;

use super::constants::THROTTLE_WINDOW;

/// Converts a megabit-per-second cap into bytes per second.
///
/// A zero cap is treated as 1 Mbit/s; configuration validation rejects it,
/// but a hand-edited config file can still carry one.
#[must_use]
pub fn bytes_per_second(speed_limit_mbps: u32) -> f64 {
    f64::from(speed_limit_mbps.max(1)) * 1_000_000.0 / 8.0
}

/// Pacing state for one transfer.
#[derive(Debug, Clone)]
pub struct Throttle {
    bytes_per_sec: f64,
    window_start: Instant,
    window_bytes: u64,
}

impl Throttle {
    /// Starts a window at `now`.
    #[must_use]
    pub fn new(speed_limit_mbps: u32, now: Instant) -> Self {
        Self {
            bytes_per_sec: bytes_per_second(speed_limit_mbps),
            window_start: now,
            window_bytes: 0,
        }
    }

    /// Accounts `bytes` read at `now` and returns how long to sleep.
    #[allow(clippy::cast_precision_loss)]
    pub fn pace(&mut self, bytes: u64, now: Instant) -> Duration {
        self.window_bytes = self.window_bytes.saturating_add(bytes);
        let expected = Duration::from_secs_f64(self.window_bytes as f64 / self.bytes_per_sec);
        let elapsed = now.saturating_duration_since(self.window_start);
        expected.saturating_sub(elapsed)
    }

    /// Restarts the window if a full second has passed since it opened.
    pub fn roll(&mut self, now: Instant) {
        if now.saturating_duration_since(self.window_start) >= THROTTLE_WINDOW {
            self.window_start = now;
            self.window_bytes = 0;
        }
    }

    /// Accounts `bytes`, sleeps off any excess and rolls the window.
    pub async fn throttle(&mut self, bytes: u64) {
        let delay = self.pace(bytes, Instant::now());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.roll(Instant::now());
    }
}
