//! Bursar API Server
//!
//! Main entry point for the Bursar accounting service.

use std::sync::Arc;

use anyhow::Context;
use bursar_api::{AppState, ChartLibrary, create_router};
use bursar_core::fiscal::FiscalYearCache;
use bursar_core::hooks::{Frequency, HookRegistry};
use bursar_db::connect_with_pool;
use bursar_shared::AppConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bursar=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    let fiscal_years = FiscalYearCache::with_config(
        config.cache.fiscal_year_capacity,
        config.cache.fiscal_year_ttl_secs,
    );
    let charts = ChartLibrary::load_dir(&config.accounting.charts_dir)?;
    let state = AppState::new(db, fiscal_years, config.accounting.clone(), charts);

    spawn_scheduler(Arc::clone(&state.hooks));

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Runs each frequency's scheduled jobs on its own interval.
fn spawn_scheduler(hooks: Arc<HookRegistry>) {
    for frequency in Frequency::ALL {
        if hooks.jobs(frequency).next().is_none() {
            continue;
        }
        let hooks = Arc::clone(&hooks);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(frequency.interval());
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let failures = hooks.run_scheduled(frequency);
                if failures > 0 {
                    warn!(%frequency, failures, "Scheduled jobs failed");
                }
            }
        });
        info!(%frequency, "Scheduler started");
    }
}
