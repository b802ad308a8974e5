//! Cron-driven price updates

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::price_sync::{PriceSync, SyncError};

/// Register the price update on `schedule` and start the scheduler
pub async fn start_scheduler(sync: PriceSync, schedule: &str) -> Result<JobScheduler> {
    let sched = JobScheduler::new().await?;

    sched
        .add(Job::new_async(schedule, move |_uuid, _l| {
            let sync = sync.clone();
            Box::pin(async move {
                match sync.run().await {
                    Ok(results) => info!(
                        updated = results.updated,
                        failed = results.failed,
                        unchanged = results.unchanged,
                        "Scheduled price update finished"
                    ),
                    Err(SyncError::AlreadyRunning) => {
                        warn!("Skipping scheduled price update, another run is in progress");
                    }
                    Err(e) => error!("Scheduled price update failed: {}", e),
                }
            })
        })?)
        .await?;

    sched.start().await?;
    info!("Scheduler started - updating prices on '{}'", schedule);

    Ok(sched)
}
