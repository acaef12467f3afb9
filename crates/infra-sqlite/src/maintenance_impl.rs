// SQLite Maintenance Implementation
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use coupon_core::error::{AppError, Result};
use coupon_core::port::{Maintenance, MaintenanceStats, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

/// SQLite maintenance implementation
pub struct SqliteMaintenance {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteMaintenance {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    /// Get DB file size in MB
    async fn get_db_size(&self) -> Result<f64> {
        let page_count: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page count: {}", e)))?;

        let page_size: i64 = sqlx::query_scalar("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page size: {}", e)))?;

        let size_bytes = page_count * page_size;
        Ok(size_bytes as f64 / (1024.0 * 1024.0))
    }
}

#[async_trait]
impl Maintenance for SqliteMaintenance {
    async fn vacuum(&self) -> Result<f64> {
        info!("Running VACUUM to optimize database...");

        let size_before = self.get_db_size().await?;

        sqlx::query("VACUUM")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let size_after = self.get_db_size().await?;
        let reclaimed = (size_before - size_after).max(0.0);

        info!(
            size_before_mb = size_before,
            size_after_mb = size_after,
            reclaimed_mb = reclaimed,
            "VACUUM completed"
        );

        Ok(reclaimed)
    }

    async fn purge_claims_before(&self, cutoff: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM claims WHERE claimed_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let deleted = result.rows_affected();
        info!(cutoff, deleted_claims = deleted, "Claim purge completed");

        Ok(deleted)
    }

    async fn get_stats(&self, counter_name: &str) -> Result<MaintenanceStats> {
        let claim_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM claims")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let counter_value: Option<i64> =
            sqlx::query_scalar("SELECT value FROM counters WHERE name = ?")
                .bind(counter_name)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(MaintenanceStats {
            db_size_mb: self.get_db_size().await?,
            claim_count,
            counter_value: counter_value.unwrap_or(0),
        })
    }

    fn now_millis(&self) -> i64 {
        self.time_provider.now_millis()
    }
}
