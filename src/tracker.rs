//! Speed tracker: turns the per-second byte counter into throughput samples.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::trace;

use crate::state::SharedState;

/// Sampling period.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Samples throughput once per [`SAMPLE_INTERVAL`], forever.
pub async fn run(state: Arc<SharedState>) {
    let mut ticker = tokio::time::interval(SAMPLE_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let mbps = state.sample_throughput();
        trace!(mbps, "throughput sample");
    }
}
