//! Download worker: the evaluate / download / cool down loop.
//!
//! The worker is a single long-lived task. Each cycle it checks operator
//! intent, runs the policy evaluation on [`SharedState`], and either idles
//! (out of schedule, quota reached), switches itself off (no targets), or
//! streams one randomly chosen target through the [`Fetcher`] followed by a
//! randomized cooldown. Every idle wait is cut short when the operator
//! disables the agent.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::download::{FetchOutcome, Fetcher, StopReason};
use crate::format::{format_bytes, truncate_url};
use crate::random::RandomSource;
use crate::state::{FetchPlan, Phase, SharedState, Verdict};
use crate::user_agent;

/// Check intervals and cooldown bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSettings {
    /// How long to wait for an enable while disabled.
    pub disabled_poll: Duration,
    /// Re-check interval outside the schedule window.
    pub out_of_schedule_recheck: Duration,
    /// Re-check interval after the daily quota is reached.
    pub quota_recheck: Duration,
    /// Cooldown after each attempt, drawn uniformly from this range.
    pub cooldown: Range<Duration>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            disabled_poll: Duration::from_secs(1),
            out_of_schedule_recheck: Duration::from_secs(30),
            quota_recheck: Duration::from_secs(60),
            cooldown: Duration::from_secs(600)..Duration::from_secs(1200),
        }
    }
}

/// The download worker.
pub struct Worker {
    state: Arc<SharedState>,
    fetcher: Fetcher,
    random: Box<dyn RandomSource>,
    settings: WorkerSettings,
}

impl Worker {
    /// Creates a worker over `state`.
    #[must_use]
    pub fn new(
        state: Arc<SharedState>,
        fetcher: Fetcher,
        random: Box<dyn RandomSource>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            state,
            fetcher,
            random,
            settings,
        }
    }

    /// Runs cycles forever. Nothing inside a cycle is fatal.
    pub async fn run(mut self) {
        info!("download worker started");
        loop {
            self.run_cycle().await;
        }
    }

    /// Runs one cycle and returns the phase it ended in:
    ///
    /// - [`Phase::Disabled`]: intent was off (or went off mid-transfer)
    /// - [`Phase::OutOfSchedule`] / [`Phase::QuotaReached`]: waited out a re-check interval
    /// - [`Phase::NoTargets`]: nothing to download, intent switched off
    /// - [`Phase::Cooldown`]: a transfer ran and the cooldown elapsed
    /// - [`Phase::Evaluating`]: a transfer was stopped by the quota; no cooldown
    pub async fn run_cycle(&mut self) -> Phase {
        if !self.state.is_enabled() {
            self.state.wait_for_enable(self.settings.disabled_poll).await;
            return Phase::Disabled;
        }

        self.state.set_phase(Phase::Evaluating);
        match self.state.evaluate() {
            Verdict::OutOfSchedule => {
                self.state.set_phase(Phase::OutOfSchedule);
                debug!("outside schedule window");
                self.state.idle(self.settings.out_of_schedule_recheck).await;
                Phase::OutOfSchedule
            }
            Verdict::QuotaReached => {
                self.state.set_phase(Phase::QuotaReached);
                debug!("daily quota reached");
                self.state.idle(self.settings.quota_recheck).await;
                Phase::QuotaReached
            }
            Verdict::NoTargets => {
                warn!("no download targets configured");
                self.state.disable_for_no_targets();
                Phase::NoTargets
            }
            Verdict::Ready(plan) => self.attempt(plan).await,
        }
    }

    #[instrument(skip_all, fields(speed_limit_mbps = plan.speed_limit_mbps))]
    async fn attempt(&mut self, plan: FetchPlan) -> Phase {
        self.state.set_phase(Phase::Starting);
        let target = &plan.targets[self.random.index(plan.targets.len())];
        let agent = user_agent::pick(self.random.as_mut());

        self.state.set_phase(Phase::Downloading);
        self.state
            .log(format!("download started: {}", truncate_url(target)));
        info!(url = %target, "download started");

        let report = self
            .fetcher
            .fetch(target, plan.speed_limit_mbps, agent, self.state.as_ref())
            .await;

        match &report.outcome {
            FetchOutcome::Failed(error) => {
                warn!(
                    url = %target,
                    bytes = report.bytes,
                    timed_out = error.is_timeout(),
                    error = %error,
                    "download failed"
                );
                self.state.log(format!(
                    "download failed: {error} ({} transferred)",
                    format_bytes(report.bytes)
                ));
            }
            FetchOutcome::Completed | FetchOutcome::Stopped(_) => {
                info!(url = %target, bytes = report.bytes, "download finished");
                self.state.log(format!(
                    "download finished: {}",
                    format_bytes(report.bytes)
                ));
            }
        }

        match report.outcome {
            FetchOutcome::Stopped(StopReason::Disabled) => return Phase::Disabled,
            FetchOutcome::Stopped(StopReason::QuotaReached) => return Phase::Evaluating,
            _ if !self.state.is_enabled() => return Phase::Disabled,
            _ => {}
        }

        self.cool_down().await;
        Phase::Cooldown
    }

    async fn cool_down(&mut self) {
        let duration = self.cooldown_duration();
        self.state.set_phase(Phase::Cooldown);
        self.state
            .log(format!("cooling down for {} s", duration.as_secs()));
        debug!(seconds = duration.as_secs(), "cooldown");
        self.state.idle(duration).await;
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cooldown_duration(&mut self) -> Duration {
        let Range { start, end } = &self.settings.cooldown;
        let (start_ms, end_ms) = (start.as_millis() as u64, end.as_millis() as u64);
        if start_ms >= end_ms {
            return *start;
        }
        Duration::from_millis(self.random.in_range(start_ms..end_ms))
    }
}
