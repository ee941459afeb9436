//! `restock watch`: run check cycles on a cron schedule until interrupted.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use restock_core::AppConfig;

use crate::check;

/// Every 15 minutes, on the minute (seconds-first cron syntax).
pub(crate) const DEFAULT_SCHEDULE: &str = "0 */15 * * * *";

/// Start the scheduler and block until ctrl-c or SIGTERM.
///
/// # Errors
///
/// Returns an error if `schedule` is not a valid cron expression or the
/// scheduler cannot be started or stopped.
pub(crate) async fn run_watch(config: Arc<AppConfig>, schedule: &str) -> anyhow::Result<()> {
    let mut scheduler = JobScheduler::new()
        .await
        .context("failed to create scheduler")?;

    register_check_job(&scheduler, schedule, config)
        .await
        .with_context(|| format!("invalid schedule '{schedule}'"))?;

    scheduler
        .start()
        .await
        .context("failed to start scheduler")?;
    tracing::info!(schedule, "watch mode started — waiting for next scheduled check");

    shutdown_signal().await;

    scheduler
        .shutdown()
        .await
        .context("failed to stop scheduler")?;
    Ok(())
}

/// Register the recurring check job.
///
/// A tick that fires while the previous cycle is still running is skipped
/// so two cycles never race on the state file.
async fn register_check_job(
    scheduler: &JobScheduler,
    schedule: &str,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let running = Arc::new(Mutex::new(()));

    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let config = Arc::clone(&config);
        let running = Arc::clone(&running);

        Box::pin(async move {
            let Ok(_guard) = running.try_lock() else {
                tracing::warn!("scheduler: previous check cycle still running — skipping this tick");
                return;
            };
            tracing::info!("scheduler: starting check cycle");
            match check::run_check(&config, &[], false).await {
                Ok(report) => tracing::info!(
                    notified = report.notified.len(),
                    unavailable = report.next.len(),
                    "scheduler: check cycle complete"
                ),
                Err(e) => tracing::error!(error = %format!("{e:#}"), "scheduler: check cycle failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping scheduler");
}
