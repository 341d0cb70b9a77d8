//! Background job scheduler.
//!
//! Registers the recurring scan when a cron expression is configured.

use mwatch_collect::Scanner;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the scheduler.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it stops all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot start or the cron
/// expression is rejected.
pub async fn build_scheduler(
    scanner: Scanner,
    scan_cron: Option<&str>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match scan_cron {
        Some(cron) => register_scan_job(&scheduler, scanner, cron).await?,
        None => tracing::info!("scheduler: MWATCH_SCAN_CRON empty; scheduled scans disabled"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Overlapping runs are not prevented; keep the interval well above the
/// expected scan duration.
async fn register_scan_job(
    scheduler: &JobScheduler,
    scanner: Scanner,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let scanner = scanner.clone();
        Box::pin(async move {
            tracing::info!("scheduler: starting scan");
            match scanner.run().await {
                Ok(result) => tracing::info!(
                    entities = result.entities_scanned,
                    mentions = result.mentions_collected,
                    "scheduler: scan complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: scan failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: scan job registered");
    Ok(())
}
