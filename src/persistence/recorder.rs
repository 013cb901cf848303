//! Ordered snapshot-and-save of the live state.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{PersistError, Store};
use crate::state::SharedState;

/// Writes snapshots of [`SharedState`] through a [`Store`].
///
/// Saves run one at a time and each takes its snapshot only once it holds
/// the turn, so the save that runs last always writes the newest state.
/// Blocking; async callers go through `tokio::task::spawn_blocking`.
pub struct Recorder {
    store: Arc<dyn Store>,
    turn: Mutex<()>,
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder").finish_non_exhaustive()
    }
}

impl Recorder {
    /// Creates a recorder over `store`.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            turn: Mutex::new(()),
        }
    }

    /// Saves the current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the record cannot be written.
    pub fn save_config(&self, state: &SharedState) -> Result<(), PersistError> {
        let _turn = self.turn.lock();
        self.store.save_config(&state.config())
    }

    /// Saves the current operator log.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the record cannot be written.
    pub fn save_logs(&self, state: &SharedState) -> Result<(), PersistError> {
        let _turn = self.turn.lock();
        self.store.save_logs(&state.logbook())
    }

    /// Writes statistics and logs. Failures are logged, never returned.
    pub fn flush(&self, state: &SharedState) {
        let _turn = self.turn.lock();
        let stats = state.statistics();
        let logs = state.logbook();
        if let Err(e) = self.store.save_statistics(&stats) {
            warn!(error = %e, "failed to save statistics");
        }
        if let Err(e) = self.store.save_logs(&logs) {
            warn!(error = %e, "failed to save logs");
        }
        debug!(today_bytes = stats.today_bytes, log_entries = logs.len(), "records flushed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::download::TransferObserver;
    use crate::persistence::JsonStore;
    use crate::state::{Configuration, LogBook, Statistics};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn state() -> SharedState {
        let now = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        SharedState::new(
            Configuration::default(),
            Statistics::starting(now.date()),
            LogBook::default(),
            Arc::new(ManualClock::new(now)),
        )
    }

    #[test]
    fn test_flush_writes_statistics_and_logs() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(JsonStore::new(temp.path()));
        let recorder = Recorder::new(store.clone());
        let state = state();
        state.record(42);
        state.log("hello");

        recorder.flush(&state);

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(store.load_statistics(today).today_bytes, 42);
        assert_eq!(store.load_logs().entries().last().unwrap().message, "hello");
    }

    #[test]
    fn test_save_config_writes_live_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(JsonStore::new(temp.path()));
        let recorder = Recorder::new(store.clone());
        let state = state();
        state.replace_config(Configuration {
            speed_limit_mbps: 17,
            ..Configuration::default()
        });

        recorder.save_config(&state).unwrap();
        assert_eq!(store.load_config().speed_limit_mbps, 17);
    }

    #[test]
    fn test_overlapping_flushes_leave_newest_statistics() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(JsonStore::new(temp.path()));
        let recorder = Recorder::new(store.clone());
        let state = state();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..20 {
                        state.record(1);
                        recorder.flush(&state);
                    }
                });
            }
        });

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(store.load_statistics(today).today_bytes, 160);
    }
}
