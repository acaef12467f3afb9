//! Shared fixtures for the integration tests

use coupon_core::application::{ClaimPolicy, ClaimService};
use coupon_core::domain::CouponSet;
use coupon_core::port::id_provider::UuidProvider;
use coupon_core::port::token_provider::RandomTokenProvider;
use coupon_core::port::TimeProvider;
use coupon_infra_sqlite::{create_pool, run_migrations, SqliteClaimRepository};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Clock that only moves when told to
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn at(ms: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(ms)))
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl TimeProvider for ManualClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Migrated in-memory database
pub async fn memory_pool() -> SqlitePool {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

/// Migrated database file under the temp dir (WAL needs a real file)
pub struct TempDb {
    pub path: PathBuf,
    pub pool: SqlitePool,
}

impl TempDb {
    pub async fn new() -> Self {
        let path = std::env::temp_dir().join(format!("coupon-test-{}.db", uuid::Uuid::new_v4()));
        let pool = Self::open(&path).await;
        Self { path, pool }
    }

    pub async fn open(path: &std::path::Path) -> SqlitePool {
        let pool = create_pool(path.to_str().unwrap()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    pub async fn cleanup(self) {
        self.pool.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

pub fn policy(coupons: &[&str], cooldown: Duration) -> ClaimPolicy {
    let coupons = CouponSet::new(coupons.iter().map(|c| c.to_string()).collect()).unwrap();
    ClaimPolicy::new(coupons, cooldown).unwrap()
}

pub fn default_policy() -> ClaimPolicy {
    ClaimPolicy::new(CouponSet::default(), Duration::from_secs(60)).unwrap()
}

pub fn service(
    pool: SqlitePool,
    clock: Arc<dyn TimeProvider>,
    policy: ClaimPolicy,
) -> Arc<ClaimService> {
    Arc::new(ClaimService::new(
        Arc::new(SqliteClaimRepository::new(pool)),
        Arc::new(UuidProvider),
        clock,
        Arc::new(RandomTokenProvider),
        policy,
    ))
}
