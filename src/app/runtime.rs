use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::AppSettings;
use super::autosave::{AUTOSAVE_INTERVAL, run_autosave};
use crate::api;
use crate::clock::{Clock, SystemClock};
use crate::control::ControlSurface;
use crate::download::Fetcher;
use crate::persistence::{JsonStore, Recorder, Store};
use crate::random::SystemRandom;
use crate::state::SharedState;
use crate::tracker;
use crate::worker::{Worker, WorkerSettings};

/// Runs the agent until SIGINT or SIGTERM.
///
/// Background tasks are aborted on shutdown; statistics and logs are flushed
/// once more before returning.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, the listener cannot
/// bind, or the server fails.
pub async fn run(settings: AppSettings) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn Store> = Arc::new(JsonStore::new(&settings.data_dir));

    let config = store.load_config();
    let stats = store.load_statistics(clock.now().date());
    let logs = store.load_logs();
    info!(
        data_dir = %settings.data_dir.display(),
        targets = config.targets.len(),
        today_bytes = stats.today_bytes,
        "records loaded"
    );

    let state = Arc::new(SharedState::new(config, stats, logs, clock));
    let recorder = Arc::new(Recorder::new(store));
    state.log("downonly initialized");
    if let Err(e) = recorder.save_logs(&state) {
        warn!(error = %e, "failed to save logs");
    }

    let fetcher = Fetcher::new().context("failed to build HTTP client")?;
    let worker = Worker::new(
        Arc::clone(&state),
        fetcher,
        Box::new(SystemRandom::new()),
        WorkerSettings::default(),
    );
    let worker_task = tokio::spawn(worker.run());
    let tracker_task = tokio::spawn(tracker::run(Arc::clone(&state)));
    let autosave_task = tokio::spawn(run_autosave(
        Arc::clone(&state),
        Arc::clone(&recorder),
        AUTOSAVE_INTERVAL,
    ));

    let addr = settings.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind control API on {addr}"))?;
    info!(%addr, "control API listening");

    let app = api::router(ControlSurface::new(Arc::clone(&state), Arc::clone(&recorder)));
    let signal_state = Arc::clone(&state);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let signal = shutdown_signal().await;
            info!(signal, "shutdown requested");
            signal_state.log(format!("received {signal}, shutting down"));
        })
        .await;

    worker_task.abort();
    tracker_task.abort();
    autosave_task.abort();
    // waits out any autosave still writing, then writes the newest snapshot
    let final_flush = {
        let state = Arc::clone(&state);
        let recorder = Arc::clone(&recorder);
        tokio::task::spawn_blocking(move || recorder.flush(&state))
    };
    if let Err(e) = final_flush.await {
        warn!(error = %e, "final flush task failed");
    }
    info!("records flushed, exiting");

    served.context("control API server failed")
}

/// Resolves on SIGINT or (on Unix) SIGTERM, returning the signal name.
pub async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => "SIGINT",
        () = terminate => "SIGTERM",
    }
}
