use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::services::sync_service::SyncService;

fn scheduler_error(err: impl std::fmt::Debug) -> Error {
    Error::Config(format!("Scheduler error: {:?}", err))
}

/// Builds the daily sync job. Failures are logged and left for the next tick.
pub fn sync_job(cron: &str, sync_service: SyncService) -> Result<Job> {
    Job::new_async(cron, move |_uuid, _scheduler| {
        let sync_service = sync_service.clone();
        Box::pin(async move {
            info!("Scheduled vacancy sync starting");
            if let Err(e) = sync_service.sync().await {
                error!(error = %e, "Scheduled vacancy sync failed");
            }
        })
    })
    .map_err(scheduler_error)
}

pub async fn start_scheduler(cron: &str, sync_service: SyncService) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await.map_err(scheduler_error)?;
    scheduler
        .add(sync_job(cron, sync_service)?)
        .await
        .map_err(scheduler_error)?;
    scheduler.start().await.map_err(scheduler_error)?;
    info!(%cron, "Vacancy sync scheduled");
    Ok(scheduler)
}
