use crate::config::BugdashConfig;
use crate::fetch::{HttpPageSource, PageSource};
use crate::publish::ReportStore;
use crate::scheduler::{Scheduler, SchedulerSettings};
use crate::server::{self, AppState};
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

/// Start the scheduler and the HTTP server and run until Ctrl-C.
pub async fn run_serve(config: BugdashConfig) -> Result<()> {
    config.validate()?;

    let source = HttpPageSource::new(&config.upstream)?;
    let store = Arc::new(ReportStore::new());
    let scheduler = Scheduler::new(source, SchedulerSettings::from(&config), store);
    let state = AppState::new(
        scheduler.store(),
        scheduler.state(),
        scheduler.history(),
        config.server.static_dir.clone(),
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        %addr,
        interval_secs = config.schedule.interval_secs,
        page_ceiling = config.upstream.page_ceiling,
        "bugdash starting"
    );

    serve_until(listener, scheduler, state, shutdown_signal()).await
}

/// Run `scheduler` and the server on `listener` until `shutdown` resolves or
/// the server fails, then stop both.
pub async fn serve_until<S, F>(
    listener: TcpListener,
    scheduler: Scheduler<S>,
    state: AppState,
    shutdown: F,
) -> Result<()>
where
    S: PageSource + 'static,
    F: Future<Output = ()>,
{
    let (stop_tx, stop_rx) = watch::channel(false);

    let scheduler_task = tokio::spawn(scheduler.run(wait_for_stop(stop_rx.clone())));
    let mut server_task = tokio::spawn(server::serve(listener, state, wait_for_stop(stop_rx)));

    let early_exit = tokio::select! {
        _ = shutdown => None,
        outcome = &mut server_task => Some(outcome),
    };
    let _ = stop_tx.send(true);

    let server_outcome = match early_exit {
        Some(outcome) => outcome,
        None => server_task.await,
    };
    scheduler_task.await.context("Scheduler task panicked")?;
    server_outcome
        .context("Server task panicked")?
        .context("HTTP server failed")?;
    Ok(())
}

async fn wait_for_stop(mut stop: watch::Receiver<bool>) {
    // A dropped sender also means stop.
    let _ = stop.wait_for(|stopped| *stopped).await;
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl-C, shutting down"),
        Err(e) => {
            error!(error = %e, "cannot listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
