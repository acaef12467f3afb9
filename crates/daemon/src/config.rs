//! Daemon configuration
//!
//! Layers: built-in defaults < optional TOML file < `COUPON_*` environment.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use coupon_core::application::constants::{
    DEFAULT_CLAIM_RETENTION, DEFAULT_COOLDOWN, DEFAULT_MAINTENANCE_INTERVAL,
};
use coupon_core::application::ClaimPolicy;
use coupon_core::domain::CouponSet;
use coupon_core::port::MaintenanceConfig;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "coupon-dispenser.toml";
const DEFAULT_DB_PATH: &str = "~/.coupon-dispenser/claims.db";
const ENV_PREFIX: &str = "COUPON";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub coupons: Vec<String>,
    pub cooldown_secs: u64,
    pub claim_retention_hours: u64,
    /// 0 disables the maintenance task
    pub maintenance_interval_secs: u64,
    pub log_format: LogFormat,
}

impl DaemonConfig {
    /// Load from `COUPON_CONFIG` (or `coupon-dispenser.toml`) and the process environment
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("COUPON_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path, Environment::with_prefix(ENV_PREFIX))
    }

    pub fn load_from(path: &str, env: Environment) -> Result<Self> {
        let default_coupons: Vec<String> = CouponSet::default().into();

        let config = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("database_url", DEFAULT_DB_PATH)?
            .set_default("coupons", default_coupons)?
            .set_default("cooldown_secs", DEFAULT_COOLDOWN.as_secs())?
            .set_default(
                "claim_retention_hours",
                DEFAULT_CLAIM_RETENTION.as_secs() / 3600,
            )?
            .set_default(
                "maintenance_interval_secs",
                DEFAULT_MAINTENANCE_INTERVAL.as_secs(),
            )?
            .set_default("log_format", "pretty")?
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                env.try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("coupons"),
            )
            .build()
            .with_context(|| format!("Failed to load configuration (file: {})", path))?;

        let config: DaemonConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let policy = self.claim_policy()?;
        if self.claim_retention() < policy.cooldown() {
            anyhow::bail!(
                "claim_retention_hours ({}) must cover the cooldown window ({}s)",
                self.claim_retention_hours,
                self.cooldown_secs
            );
        }
        Ok(())
    }

    pub fn claim_policy(&self) -> Result<ClaimPolicy> {
        let coupons = CouponSet::new(self.coupons.clone()).context("Invalid coupons")?;
        let policy = ClaimPolicy::new(coupons, Duration::from_secs(self.cooldown_secs))
            .context("Invalid cooldown_secs")?;
        Ok(policy)
    }

    pub fn claim_retention(&self) -> Duration {
        Duration::from_secs(self.claim_retention_hours * 3600)
    }

    pub fn maintenance_interval(&self) -> Option<Duration> {
        (self.maintenance_interval_secs > 0)
            .then(|| Duration::from_secs(self.maintenance_interval_secs))
    }

    pub fn maintenance_config(&self) -> MaintenanceConfig {
        MaintenanceConfig {
            claim_retention_ms: self.claim_retention().as_millis() as i64,
            ..Default::default()
        }
    }

    /// Database URL with `~` expanded; parent directories of file paths are created
    pub fn resolved_database_url(&self) -> Result<String> {
        if self.database_url.starts_with("sqlite:") {
            return Ok(self.database_url.clone());
        }

        let path = shellexpand::tilde(&self.database_url).into_owned();
        if let Some(parent) = std::path::Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        Ok(path)
    }
}
