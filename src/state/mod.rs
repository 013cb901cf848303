//! Shared runtime state: the single synchronization boundary of the agent.
//!
//! [`SharedState`] owns the configuration, the byte statistics, the live
//! status and the operator log behind one [`parking_lot::Mutex`]. The lock is
//! private; every accessor takes it for the shortest possible scope and never
//! across an `.await`, so the worker's network I/O, the speed tracker and the
//! control surface never block each other for longer than a counter update.
//!
//! Enable/disable transitions additionally fire a [`Notify`] so that idle
//! states ([`SharedState::idle`], [`SharedState::wait_for_enable`]) can react
//! immediately instead of at the next poll boundary.

mod config;
mod logbook;
mod stats;
mod status;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::clock::Clock;
use crate::download::{StopReason, TransferObserver};
use crate::policy::{in_schedule, quota_reached, rollover_if_needed};

pub use config::{ConfigError, Configuration, DEFAULT_TARGET};
pub use logbook::{DEFAULT_LOG_CAPACITY, LogBook, LogEntry};
pub use stats::Statistics;
pub use status::{
    DayBytes, MonthHistory, Phase, StatusReport, THROUGHPUT_HISTORY_LEN, ThroughputHistory,
};

/// Outcome of one policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Current time is outside the schedule window.
    OutOfSchedule,
    /// Today's bytes have reached the daily quota.
    QuotaReached,
    /// The target list is empty.
    NoTargets,
    /// Clear to download with this snapshot of the policy.
    Ready(FetchPlan),
}

/// Configuration snapshot taken before a download; the lock is released
/// before any network I/O starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    /// Candidate targets, in configured order.
    pub targets: Vec<String>,
    /// Throughput cap for this attempt.
    pub speed_limit_mbps: u32,
}

#[derive(Debug)]
struct Inner {
    config: Configuration,
    stats: Statistics,
    logs: LogBook,
    enabled: bool,
    phase: Phase,
    current_mbps: f64,
    history: ThroughputHistory,
    started_at: Option<NaiveDateTime>,
    bytes_this_second: u64,
}

impl Inner {
    fn log(&mut self, now: NaiveDateTime, message: impl Into<String>) {
        self.logs
            .append(now.format("%H:%M:%S").to_string(), message.into());
    }

    fn rollover(&mut self, now: NaiveDateTime) {
        if rollover_if_needed(&mut self.stats, now.date()) {
            self.log(now, "day changed, daily counter reset");
        }
    }
}

/// Context object shared by the worker, the speed tracker and the control
/// surface.
pub struct SharedState {
    inner: Mutex<Inner>,
    wake: Notify,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SharedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedState")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl SharedState {
    /// Creates the state from loaded records. The agent starts disabled.
    #[must_use]
    pub fn new(
        config: Configuration,
        stats: Statistics,
        logs: LogBook,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner {
                config,
                stats,
                logs,
                enabled: false,
                phase: Phase::Disabled,
                current_mbps: 0.0,
                history: ThroughputHistory::default(),
                started_at: None,
                bytes_this_second: 0,
            }),
            wake: Notify::new(),
            clock,
        }
    }

    /// Current wall-clock time from the injected clock.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    // ==================== Operator intent ====================

    /// Whether the operator wants the agent running.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    /// Sets operator intent; returns the new value. No-op if unchanged.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        let now = self.clock.now();
        {
            let mut inner = self.inner.lock();
            if inner.enabled == enabled {
                return enabled;
            }
            Self::apply_enabled(&mut inner, enabled, now);
        }
        self.wake.notify_waiters();
        enabled
    }

    /// Flips operator intent; returns the new value.
    pub fn toggle(&self) -> bool {
        let now = self.clock.now();
        let enabled = {
            let mut inner = self.inner.lock();
            let enabled = !inner.enabled;
            Self::apply_enabled(&mut inner, enabled, now);
            enabled
        };
        self.wake.notify_waiters();
        enabled
    }

    fn apply_enabled(inner: &mut Inner, enabled: bool, now: NaiveDateTime) {
        inner.enabled = enabled;
        if enabled {
            inner.phase = Phase::Evaluating;
            inner.started_at = Some(now);
            inner.log(now, "service started");
        } else {
            inner.phase = Phase::Disabled;
            inner.current_mbps = 0.0;
            inner.log(now, "service stopped");
        }
    }

    /// Switches the agent off because nothing is configured to download.
    pub fn disable_for_no_targets(&self) {
        let now = self.clock.now();
        {
            let mut inner = self.inner.lock();
            inner.enabled = false;
            inner.phase = Phase::NoTargets;
            inner.current_mbps = 0.0;
            inner.log(now, "no download targets configured, service stopped");
        }
        self.wake.notify_waiters();
    }

    // ==================== Phase and log ====================

    /// Current worker phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.lock().phase
    }

    /// Records the worker phase. Ignored while disabled, so the status keeps
    /// showing why the agent is off.
    pub fn set_phase(&self, phase: Phase) {
        let mut inner = self.inner.lock();
        if inner.enabled {
            inner.phase = phase;
        }
    }

    /// Appends a message to the operator log, stamped with the current time.
    pub fn log(&self, message: impl Into<String>) {
        let now = self.clock.now();
        self.inner.lock().log(now, message);
    }

    /// Copy of the operator log.
    #[must_use]
    pub fn logbook(&self) -> LogBook {
        self.inner.lock().logs.clone()
    }

    // ==================== Configuration ====================

    /// Copy of the current configuration.
    #[must_use]
    pub fn config(&self) -> Configuration {
        self.inner.lock().config.clone()
    }

    /// Replaces the whole configuration. In-flight fetches keep the
    /// snapshot they started with.
    pub fn replace_config(&self, config: Configuration) {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let message = format!(
            "config updated: {} Mbps, {} GB/day, {} - {}",
            config.speed_limit_mbps,
            config.daily_quota_gb,
            config.schedule_start,
            config.schedule_end
        );
        inner.config = config;
        inner.log(now, message);
    }

    // ==================== Policy ====================

    /// Runs rollover, schedule, quota and target checks as one atomic step
    /// and snapshots what a download needs.
    #[must_use]
    pub fn evaluate(&self) -> Verdict {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        inner.rollover(now);

        let config = &inner.config;
        if !in_schedule(now.time(), &config.schedule_start, &config.schedule_end) {
            return Verdict::OutOfSchedule;
        }
        if quota_reached(inner.stats.today_bytes, config.daily_quota_gb) {
            return Verdict::QuotaReached;
        }
        if config.targets.is_empty() {
            return Verdict::NoTargets;
        }
        Verdict::Ready(FetchPlan {
            targets: config.targets.clone(),
            speed_limit_mbps: config.speed_limit_mbps,
        })
    }

    // ==================== Byte accounting ====================

    /// Bytes transferred today.
    #[must_use]
    pub fn today_bytes(&self) -> u64 {
        self.inner.lock().stats.today_bytes
    }

    /// Copy of the statistics record.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        self.inner.lock().stats.clone()
    }

    /// One speed-tracker tick: rollover check, drain the per-second counter
    /// into a throughput sample and push it onto the history ring. Returns
    /// the sample in Mbit/s.
    #[allow(clippy::cast_precision_loss)]
    pub fn sample_throughput(&self) -> f64 {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        inner.rollover(now);

        let bytes = std::mem::take(&mut inner.bytes_this_second);
        let mbps = if inner.enabled {
            bytes as f64 * 8.0 / 1_000_000.0
        } else {
            0.0
        };
        inner.current_mbps = mbps;
        inner.history.push(mbps);
        mbps
    }

    /// Throughput over the last full second, Mbit/s.
    #[must_use]
    pub fn current_throughput(&self) -> f64 {
        self.inner.lock().current_mbps
    }

    /// Recent throughput samples, oldest first.
    #[must_use]
    pub fn throughput_history(&self) -> Vec<f64> {
        self.inner.lock().history.to_vec()
    }

    // ==================== Reports ====================

    /// Status snapshot for the control surface.
    #[must_use]
    pub fn status_report(&self) -> StatusReport {
        let now = self.clock.now();
        let inner = self.inner.lock();
        let uptime_seconds = match (inner.enabled, inner.started_at) {
            (true, Some(started)) => (now - started).num_seconds().max(0),
            _ => 0,
        };
        StatusReport {
            phase: inner.phase,
            current_mbps: inner.current_mbps,
            history: inner.history.to_vec(),
            today_bytes: inner.stats.today_bytes,
            today_date: inner.stats.today_date,
            uptime_seconds,
            daily_quota_gb: inner.config.daily_quota_gb,
        }
    }

    /// Per-day totals for `month` (1-12) of the current year.
    #[must_use]
    pub fn month_history(&self, month: u32) -> MonthHistory {
        let year = self.clock.now().year();
        let dates = days_of_month(year, month);
        let inner = self.inner.lock();
        let days: Vec<DayBytes> = dates
            .into_iter()
            .map(|date| DayBytes {
                day: date.day(),
                bytes: inner.stats.bytes_on(date),
            })
            .collect();
        MonthHistory {
            month,
            month_total_bytes: days.iter().map(|d| d.bytes).sum(),
            days,
        }
    }

    // ==================== Idle waits ====================

    /// Sleeps for `duration` unless operator intent changes first.
    ///
    /// Returns `true` if the full duration elapsed, `false` if it was cut
    /// short by a disable or by a disable followed by a re-enable. Either
    /// way the caller starts over with a fresh evaluation.
    pub async fn idle(&self, duration: Duration) -> bool {
        let notified = self.wake.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if !self.is_enabled() {
            return false;
        }
        tokio::select! {
            () = tokio::time::sleep(duration) => true,
            () = &mut notified => false,
        }
    }

    /// Waits up to `poll` for the agent to be enabled. Returns the intent
    /// observed afterwards.
    pub async fn wait_for_enable(&self, poll: Duration) -> bool {
        let notified = self.wake.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_enabled() {
            return true;
        }
        tokio::select! {
            () = tokio::time::sleep(poll) => {}
            () = &mut notified => {}
        }
        self.is_enabled()
    }
}

impl TransferObserver for SharedState {
    fn should_stop(&self) -> Option<StopReason> {
        let inner = self.inner.lock();
        if !inner.enabled {
            Some(StopReason::Disabled)
        } else if quota_reached(inner.stats.today_bytes, inner.config.daily_quota_gb) {
            Some(StopReason::QuotaReached)
        } else {
            None
        }
    }

    fn record(&self, bytes: u64) {
        let mut inner = self.inner.lock();
        inner.stats.today_bytes = inner.stats.today_bytes.saturating_add(bytes);
        inner.bytes_this_second = inner.bytes_this_second.saturating_add(bytes);
    }
}

fn days_of_month(year: i32, month: u32) -> Vec<NaiveDate> {
    (1..=31)
        .map_while(|day| NaiveDate::from_ymd_opt(year, month, day))
        .collect()
}
