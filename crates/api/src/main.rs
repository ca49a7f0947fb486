use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use ads_exporter_api::jobs::{JobScheduler, ScheduledExportJob};
use ads_exporter_api::services::{
    ExportRunner, FacebookAdsClient, GoogleSheetsClient, PgConfigStore,
};
use ads_exporter_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Arc::new(config::Config::load()?);

    middleware::logging::init_logging(&config.logging);
    info!("Starting Ads Exporter v{}", env!("CARGO_PKG_VERSION"));

    let metrics = middleware::install_recorder()?;

    let pool = persistence::db::create_pool(&config.pool_config()).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let runner = Arc::new(ExportRunner::new(
        Arc::new(PgConfigStore::new(pool.clone())),
        Arc::new(FacebookAdsClient::new(&config.facebook)?),
        Arc::new(GoogleSheetsClient::new(&config.google)?),
    ));

    let mut scheduler = JobScheduler::new();
    if config.scheduler.enabled {
        scheduler.register(ScheduledExportJob::new(
            Arc::clone(&runner),
            config.scheduler.tick_minutes,
        ));
        scheduler.start();
    } else {
        info!("Background exports disabled by configuration");
    }

    let app = app::create_app(config.clone(), pool, runner, metrics);

    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, draining background jobs");
    scheduler.shutdown();
    scheduler
        .wait_for_shutdown(Duration::from_secs(config.scheduler.shutdown_grace_secs))
        .await;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    info!("Shutdown signal received");
}
