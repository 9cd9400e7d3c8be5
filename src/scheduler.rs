use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::{config::Config, fetcher::TrackingFetcher};

pub async fn create_and_run_scheduler(config: &Config, fetcher: Arc<TrackingFetcher>) -> Result<()> {
    let scheduler = JobScheduler::new().await?;

    let job_fetcher = fetcher.clone();
    let job = Job::new_async(config.cron_schedule.as_str(), move |_uuid, _l| {
        let fetcher = job_fetcher.clone();
        Box::pin(async move {
            execute_tracking_job(fetcher).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    execute_tracking_job(fetcher.clone()).await;

    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
    }
}

async fn execute_tracking_job(fetcher: Arc<TrackingFetcher>) {
    info!("Executing scheduled tracking refresh");

    match fetcher.run().await {
        Ok(updated) => info!(updated, "Tracking refresh completed"),
        Err(e) => error!(error = %e, "Error during tracking refresh"),
    }
}
