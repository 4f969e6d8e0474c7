//! Long-running mode: tick loop plus HTTP server until a shutdown signal.

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use switchyard_adapter_http_axum::state::AppState;
use switchyard_app::engine::ExecutionEngine;
use switchyard_app::ports::{ActionRepository, CredentialStore, DriverFactory};
use switchyard_app::services::ActionService;

use crate::config::Config;

/// Serve the API and run cycles until Ctrl-C or SIGTERM.
///
/// A cycle that is running when the signal arrives finishes before the
/// process exits.
///
/// # Errors
///
/// Returns an error when the listener cannot bind or the server fails.
pub async fn run<R, C, F>(
    config: &Config,
    engine: ExecutionEngine<R, C, F>,
    service: ActionService<R>,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: ActionRepository + Send + Sync + 'static,
    C: CredentialStore + Send + Sync + 'static,
    F: DriverFactory + Send + Sync + 'static,
{
    let (stop_tx, stop_rx) = watch::channel(false);
    let ticker = tokio::spawn(tick_loop(
        engine,
        config.tick_interval(),
        config.engine.run_on_start,
        stop_rx,
    ));

    let app = switchyard_adapter_http_axum::router::build(AppState::new(service));
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, tick_secs = config.engine.tick_secs, "switchyardd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The receiver only goes away if the loop already ended.
    let _ = stop_tx.send(true);
    ticker.await?;
    tracing::info!("switchyardd stopped");
    Ok(())
}

/// Run one cycle per tick. The next tick is awaited only after the previous
/// cycle returned, so cycles never overlap.
async fn tick_loop<R, C, F>(
    engine: ExecutionEngine<R, C, F>,
    period: std::time::Duration,
    run_on_start: bool,
    mut stop: watch::Receiver<bool>,
) where
    R: ActionRepository,
    C: CredentialStore,
    F: DriverFactory,
{
    let start = if run_on_start {
        Instant::now()
    } else {
        Instant::now() + period
    };
    let mut timer = tokio::time::interval_at(start, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = timer.tick() => {}
            _ = stop.changed() => break,
        }
        if let Err(err) = engine.run_cycle().await {
            tracing::error!(error = ?err, "execution cycle aborted, retrying next tick");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
