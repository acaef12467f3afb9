// Claim history maintenance port
use crate::error::Result;
use async_trait::async_trait;

/// Database maintenance statistics
#[derive(Debug, Clone)]
pub struct MaintenanceStats {
    pub db_size_mb: f64,
    pub claim_count: i64,
    pub counter_value: i64,
}

/// Maintenance configuration
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// How long claims are kept (ms). Must be >= the cooldown window.
    pub claim_retention_ms: i64,

    /// Maximum DB size before forcing VACUUM (MB)
    pub max_db_size_mb: f64,

    /// Counter reported in stats
    pub counter_name: String,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            claim_retention_ms: 7 * 24 * 60 * 60 * 1000, // 7 days
            max_db_size_mb: 500.0,
            counter_name: crate::domain::DEFAULT_COUNTER_NAME.to_string(),
        }
    }
}

/// Database maintenance operations
#[async_trait]
pub trait Maintenance: Send + Sync {
    /// Run VACUUM to reclaim space
    ///
    /// # Returns
    /// Space reclaimed in MB
    async fn vacuum(&self) -> Result<f64>;

    /// Delete claims issued strictly before `cutoff` (epoch ms)
    ///
    /// # Returns
    /// Number of claims deleted
    async fn purge_claims_before(&self, cutoff: i64) -> Result<u64>;

    /// Get maintenance statistics
    async fn get_stats(&self, counter_name: &str) -> Result<MaintenanceStats>;

    /// Current time as seen by the store (epoch ms)
    fn now_millis(&self) -> i64;

    /// Run full maintenance (purge + conditional VACUUM)
    async fn run_full_maintenance(&self, config: &MaintenanceConfig) -> Result<MaintenanceStats> {
        let stats_before = self.get_stats(&config.counter_name).await?;

        let cutoff = self.now_millis() - config.claim_retention_ms;
        let purged = self.purge_claims_before(cutoff).await?;

        let reclaimed_mb = if stats_before.db_size_mb > config.max_db_size_mb {
            self.vacuum().await?
        } else {
            0.0
        };

        let stats_after = self.get_stats(&config.counter_name).await?;

        tracing::info!(
            purged_claims = purged,
            reclaimed_mb = reclaimed_mb,
            claim_count = stats_after.claim_count,
            db_size_mb = stats_after.db_size_mb,
            "Maintenance completed"
        );

        Ok(stats_after)
    }
}
