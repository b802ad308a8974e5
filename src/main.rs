use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pharmacy_price_sync::config::Config;
use pharmacy_price_sync::database::Database;
use pharmacy_price_sync::price_sync::PriceSync;
use pharmacy_price_sync::scheduler::start_scheduler;
use pharmacy_price_sync::scrapers::HttpFetcher;
use pharmacy_price_sync::server::build_router;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    info!("Starting pharmacy price sync");

    let config = Config::from_env().context("Failed to load configuration")?;
    let database = Database::new(&config.database_url).await?;
    let fetcher = HttpFetcher::new(&config.user_agent, config.fetch_timeout)?;

    let sync = PriceSync::from_config(&config, Arc::new(database), Arc::new(fetcher));
    info!(adapters = ?sync.dispatcher().adapter_names(), "Site adapters registered");

    // Kept alive for the lifetime of the server
    let _scheduler = match &config.sync_schedule {
        Some(schedule) => Some(start_scheduler(sync.clone(), schedule).await?),
        None => {
            warn!("SYNC_SCHEDULE is empty - scheduled price updates are disabled");
            None
        }
    };

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, build_router(sync))
        .await
        .context("Server error")?;

    Ok(())
}
