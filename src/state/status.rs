//! Live, in-memory status: worker phase and throughput samples.

use std::collections::VecDeque;

use chrono::NaiveDate;
use serde::Serialize;

/// Number of one-second throughput samples kept for the status chart.
pub const THROUGHPUT_HISTORY_LEN: usize = 30;

/// What the download worker is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Operator intent is off.
    Disabled,
    /// Checking schedule, quota and targets.
    Evaluating,
    /// Outside the daily window; re-checked periodically.
    OutOfSchedule,
    /// Daily quota used up; re-checked periodically.
    QuotaReached,
    /// No targets configured; the worker switched itself off.
    NoTargets,
    /// Target picked, connection being opened.
    Starting,
    /// Transfer in progress.
    Downloading,
    /// Randomized pause between attempts.
    Cooldown,
}

/// Fixed-length ring of throughput samples in Mbit/s, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputHistory {
    samples: VecDeque<f64>,
}

impl Default for ThroughputHistory {
    fn default() -> Self {
        Self {
            samples: std::iter::repeat_n(0.0, THROUGHPUT_HISTORY_LEN).collect(),
        }
    }
}

impl ThroughputHistory {
    /// Appends a sample, evicting the oldest beyond the fixed length.
    pub fn push(&mut self, mbps: f64) {
        self.samples.push_back(mbps);
        while self.samples.len() > THROUGHPUT_HISTORY_LEN {
            self.samples.pop_front();
        }
    }

    /// Copies the samples out, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }
}

/// Snapshot returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// Worker phase.
    #[serde(rename = "status")]
    pub phase: Phase,
    /// Throughput over the last full second, Mbit/s.
    #[serde(rename = "speed_mbps")]
    pub current_mbps: f64,
    /// Last [`THROUGHPUT_HISTORY_LEN`] samples, oldest first.
    #[serde(rename = "speed_history")]
    pub history: Vec<f64>,
    /// Bytes transferred today.
    pub today_bytes: u64,
    /// Date `today_bytes` applies to.
    pub today_date: Option<NaiveDate>,
    /// Seconds since the last enable, zero while disabled.
    pub uptime_seconds: i64,
    /// Configured daily quota.
    pub daily_quota_gb: u64,
}

/// Bytes transferred on one day of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayBytes {
    /// Day of month, 1-based.
    pub day: u32,
    /// Bytes recorded that day.
    pub bytes: u64,
}

/// Per-day transfer totals for one month of the current year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthHistory {
    /// Month, 1-12.
    pub month: u32,
    /// Sum over `days`.
    pub month_total_bytes: u64,
    /// Every day of the month in order, zero when nothing was recorded.
    pub days: Vec<DayBytes>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_history_starts_full_of_zeros() {
        let history = ThroughputHistory::default();
        assert_eq!(history.to_vec().len(), THROUGHPUT_HISTORY_LEN);
        assert!(history.to_vec().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_history_never_exceeds_fixed_length() {
        let mut history = ThroughputHistory::default();
        for i in 0..100 {
            history.push(f64::from(i));
            assert_eq!(history.to_vec().len(), THROUGHPUT_HISTORY_LEN);
        }
        let samples = history.to_vec();
        assert_eq!(samples.first().copied(), Some(70.0));
        assert_eq!(samples.last().copied(), Some(99.0));
    }

    #[test]
    fn test_phase_wire_names() {
        assert_eq!(
            serde_json::to_value(Phase::OutOfSchedule).unwrap(),
            "out_of_schedule"
        );
        assert_eq!(serde_json::to_value(Phase::Cooldown).unwrap(), "cooldown");
    }
}
