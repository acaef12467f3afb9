//! Coupon Dispenser - Main Entry Point

mod config;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use config::{DaemonConfig, LogFormat};
use coupon_api_http::{HttpServer, HttpServerConfig};
use coupon_core::application::{ClaimService, MaintenanceScheduler};
use coupon_core::port::id_provider::UuidProvider;
use coupon_core::port::time_provider::SystemTimeProvider;
use coupon_core::port::token_provider::RandomTokenProvider;
use coupon_infra_sqlite::{create_pool, run_migrations, SqliteClaimRepository, SqliteMaintenance};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str =
    "coupon_dispenser=info,coupon_core=info,coupon_infra_sqlite=info,coupon_api_http=info,tower_http=warn";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration (needed for the log format)
    let config = DaemonConfig::load()?;

    // 2. Initialize logging
    init_logging(config.log_format)?;

    info!("Coupon Dispenser v{} starting...", VERSION);

    let policy = config.claim_policy()?;
    info!(
        coupons = policy.coupons().len(),
        cooldown_secs = policy.cooldown_secs(),
        counter = policy.counter_name(),
        "Claim policy loaded"
    );

    // 3. Initialize database
    let database_url = config.resolved_database_url()?;
    info!(database_url = %database_url, "Initializing database...");

    let pool = create_pool(&database_url)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let claim_repo = Arc::new(SqliteClaimRepository::new(pool.clone()));

    let service = Arc::new(ClaimService::new(
        claim_repo,
        Arc::new(UuidProvider),
        time_provider.clone(),
        Arc::new(RandomTokenProvider),
        policy.clone(),
    ));

    // 5. Start maintenance (claim retention)
    match config.maintenance_interval() {
        Some(every) => {
            let maintenance = Arc::new(SqliteMaintenance::new(pool.clone(), time_provider));
            let scheduler = MaintenanceScheduler::new(
                maintenance,
                config.maintenance_config(),
                policy.cooldown(),
                every,
            )?;
            tokio::spawn(scheduler.run());
        }
        None => info!("Maintenance disabled (maintenance_interval_secs = 0)"),
    }

    // 6. Start HTTP server
    let server = HttpServer::new(
        HttpServerConfig {
            host: config.host.clone(),
            port: config.port,
        },
        service,
    )
    .bind()
    .await?;

    info!("✅ System ready. Press Ctrl+C to shutdown");

    server.serve(shutdown_signal()).await?;

    pool.close().await;
    info!("Shutdown complete.");

    Ok(())
}

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    match format {
        // Production: JSON structured logging
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init(),
        // Development: Pretty formatting with colors
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .init(),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received. Draining connections...");
}
