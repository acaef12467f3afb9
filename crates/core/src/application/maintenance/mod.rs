// Maintenance Service
// Periodic claim-history retention and DB compaction

use crate::error::{AppError, Result};
use crate::port::{Maintenance, MaintenanceConfig, MaintenanceStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Maintenance scheduler
///
/// Runs periodic maintenance (claim purge, VACUUM) in the background
pub struct MaintenanceScheduler {
    maintenance: Arc<dyn Maintenance>,
    config: MaintenanceConfig,
    every: Duration,
}

impl MaintenanceScheduler {
    /// Create a new maintenance scheduler
    ///
    /// # Arguments
    /// * `maintenance` - Maintenance implementation
    /// * `config` - Maintenance configuration
    /// * `cooldown` - Claim cooldown window; retention may not be shorter
    /// * `every` - How often to run maintenance
    pub fn new(
        maintenance: Arc<dyn Maintenance>,
        config: MaintenanceConfig,
        cooldown: Duration,
        every: Duration,
    ) -> Result<Self> {
        // Purging a claim still inside its window would reopen the cooldown
        if (config.claim_retention_ms as u128) < cooldown.as_millis() {
            return Err(AppError::Config(format!(
                "claim retention ({} ms) is shorter than the cooldown window ({} ms)",
                config.claim_retention_ms,
                cooldown.as_millis()
            )));
        }
        if every.is_zero() {
            return Err(AppError::Config(
                "maintenance interval must be positive".to_string(),
            ));
        }

        Ok(Self {
            maintenance,
            config,
            every,
        })
    }

    /// Run maintenance loop (background task)
    ///
    /// Should be spawned in tokio::spawn
    pub async fn run(self) {
        info!(
            interval_secs = self.every.as_secs(),
            retention_ms = self.config.claim_retention_ms,
            "Maintenance scheduler started"
        );

        let mut tick = interval(self.every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tick.tick().await;

            match self.maintenance.run_full_maintenance(&self.config).await {
                Ok(stats) => {
                    info!(
                        db_size_mb = stats.db_size_mb,
                        claim_count = stats.claim_count,
                        counter = stats.counter_value,
                        "Scheduled maintenance completed successfully"
                    );
                }
                Err(e) => {
                    error!(error = ?e, "Scheduled maintenance failed");
                }
            }
        }
    }

    /// Run maintenance immediately (for manual trigger)
    pub async fn run_now(&self) -> Result<MaintenanceStats> {
        info!("Running manual maintenance...");
        self.maintenance.run_full_maintenance(&self.config).await
    }
}
