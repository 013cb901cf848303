//! Periodic flushing of statistics and the operator log.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::warn;

use crate::persistence::Recorder;
use crate::state::SharedState;

/// How often statistics and logs are written.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(60);

/// Flushes every `interval`, forever.
pub async fn run_autosave(state: Arc<SharedState>, recorder: Arc<Recorder>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let state = Arc::clone(&state);
        let recorder = Arc::clone(&recorder);
        if let Err(e) = tokio::task::spawn_blocking(move || recorder.flush(&state)).await {
            warn!(error = %e, "autosave task failed");
        }
    }
}
