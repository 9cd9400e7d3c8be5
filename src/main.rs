use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use cttexpress_carrier::{
    carrier::CttExpressCarrier,
    config::Config,
    fetcher::TrackingFetcher,
    scheduler,
    shipment::ShipmentClient,
    store::JsonFileStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    let api = Arc::new(ShipmentClient::new(config.clone())?);
    let carrier = Arc::new(CttExpressCarrier::new(config.clone(), api));

    carrier
        .validate_user()
        .await
        .context("CTT Express credentials rejected")?;
    carrier
        .check_service_type()
        .await
        .context("CTT Express service check failed")?;

    tracing::info!(
        endpoint = %config.api_url,
        store = %config.shipments_file.display(),
        cron = %config.cron_schedule,
        "CTT Express credentials validated"
    );

    let store = Arc::new(JsonFileStore::new(config.shipments_file.clone()));
    let fetcher = Arc::new(TrackingFetcher::new(carrier, store));

    scheduler::create_and_run_scheduler(&config, fetcher).await?;

    Ok(())
}
