//! Control surface: the operations exposed to the operator.
//!
//! Transport-agnostic; [`crate::api`] maps these onto HTTP routes.

use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::persistence::Recorder;
use crate::state::{
    ConfigError, Configuration, LogBook, MonthHistory, SharedState, StatusReport,
};

/// Result of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleResponse {
    /// Operator intent after the toggle.
    pub is_running: bool,
}

/// Operator-facing operations over the shared state and the store.
#[derive(Clone)]
pub struct ControlSurface {
    state: Arc<SharedState>,
    recorder: Arc<Recorder>,
}

impl std::fmt::Debug for ControlSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlSurface")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ControlSurface {
    /// Creates a control surface.
    pub fn new(state: Arc<SharedState>, recorder: Arc<Recorder>) -> Self {
        Self { state, recorder }
    }

    /// Live status snapshot.
    #[must_use]
    pub fn status(&self) -> StatusReport {
        self.state.status_report()
    }

    /// Flips operator intent.
    pub fn toggle(&self) -> ToggleResponse {
        let is_running = self.state.toggle();
        info!(is_running, "operator toggled service");
        ToggleResponse { is_running }
    }

    /// Per-day totals for `month` of the current year. A missing or
    /// out-of-range month means the current month.
    #[must_use]
    pub fn history(&self, month: Option<u32>) -> MonthHistory {
        let month = month
            .filter(|m| (1..=12).contains(m))
            .unwrap_or_else(|| self.state.now().month());
        self.state.month_history(month)
    }

    /// Copy of the operator log.
    #[must_use]
    pub fn logs(&self) -> LogBook {
        self.state.logbook()
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> Configuration {
        self.state.config()
    }

    /// Validates and installs a new configuration, then persists it.
    ///
    /// A rejected payload leaves the configuration unchanged. A failed save
    /// is logged; the new configuration stays in effect. Overlapping updates
    /// are saved in turn, and the last save writes whichever configuration
    /// is live at that point.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the payload is malformed or invalid.
    #[instrument(skip_all, fields(bytes = payload.len()))]
    pub async fn set_config(&self, payload: &[u8]) -> Result<Configuration, ConfigError> {
        let config = Configuration::from_json(payload)?;
        self.state.replace_config(config.clone());
        info!(
            speed_limit_mbps = config.speed_limit_mbps,
            daily_quota_gb = config.daily_quota_gb,
            targets = config.targets.len(),
            "configuration updated"
        );

        let recorder = Arc::clone(&self.recorder);
        let state = Arc::clone(&self.state);
        match tokio::task::spawn_blocking(move || recorder.save_config(&state)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "failed to persist configuration"),
            Err(e) => warn!(error = %e, "configuration save task failed"),
        }
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::persistence::{JsonStore, Store};
    use crate::state::Statistics;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn surface(temp: &TempDir) -> ControlSurface {
        let now = NaiveDate::from_ymd_opt(2025, 4, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let state = Arc::new(SharedState::new(
            Configuration::default(),
            Statistics::starting(now.date()),
            LogBook::default(),
            Arc::new(ManualClock::new(now)),
        ));
        let store = Arc::new(JsonStore::new(temp.path()));
        ControlSurface::new(state, Arc::new(Recorder::new(store)))
    }

    #[test]
    fn test_toggle_flips_intent() {
        let temp = TempDir::new().unwrap();
        let control = surface(&temp);
        assert!(control.toggle().is_running);
        assert_eq!(control.status().phase, crate::state::Phase::Evaluating);
        assert!(!control.toggle().is_running);
    }

    #[test]
    fn test_history_falls_back_to_current_month() {
        let temp = TempDir::new().unwrap();
        let control = surface(&temp);
        assert_eq!(control.history(None).month, 4);
        assert_eq!(control.history(Some(0)).month, 4);
        assert_eq!(control.history(Some(13)).month, 4);
        let february = control.history(Some(2));
        assert_eq!(february.month, 2);
        assert_eq!(february.days.len(), 28);
    }

    #[tokio::test]
    async fn test_set_config_replaces_logs_and_persists() {
        let temp = TempDir::new().unwrap();
        let control = surface(&temp);
        let payload = br#"{"speed_limit_mbps":9,"daily_quota_gb":1,"schedule_start":"00:00","schedule_end":"23:59","urls":["http://example.com/x"]}"#;

        let config = control.set_config(payload).await.unwrap();
        assert_eq!(config.speed_limit_mbps, 9);
        assert_eq!(control.config(), config);
        assert!(
            control
                .logs()
                .entries()
                .any(|e| e.message.starts_with("config updated"))
        );

        let stored = JsonStore::new(temp.path()).load_config();
        assert_eq!(stored, config);
    }

    #[tokio::test]
    async fn test_set_config_rejects_and_keeps_previous() {
        let temp = TempDir::new().unwrap();
        let control = surface(&temp);
        let before = control.config();

        assert!(control.set_config(b"nope").await.is_err());
        assert!(
            control
                .set_config(br#"{"speed_limit_mbps":0,"daily_quota_gb":1,"schedule_start":"00:00","schedule_end":"23:59","urls":[]}"#)
                .await
                .is_err()
        );
        assert_eq!(control.config(), before);
        assert!(!temp.path().join("config.json").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_updates_leave_disk_matching_memory() {
        let temp = TempDir::new().unwrap();
        let control = surface(&temp);
        let store = JsonStore::new(temp.path());

        for round in 0..20 {
            let updates: Vec<_> = (1..=16u32)
                .map(|speed| {
                    let control = control.clone();
                    tokio::spawn(async move {
                        let payload = format!(
                            r#"{{"speed_limit_mbps":{speed},"daily_quota_gb":1,"schedule_start":"00:00","schedule_end":"23:59","urls":["http://example.com/{speed}"]}}"#
                        );
                        control.set_config(payload.as_bytes()).await.unwrap();
                    })
                })
                .collect();
            for update in updates {
                update.await.unwrap();
            }

            let raw = std::fs::read(temp.path().join(crate::persistence::CONFIG_FILE)).unwrap();
            let on_disk: Configuration = serde_json::from_slice(&raw).unwrap();
            assert_eq!(on_disk, control.config(), "round {round}");
            assert_eq!(store.load_config(), control.config(), "round {round}");
        }
    }
}
