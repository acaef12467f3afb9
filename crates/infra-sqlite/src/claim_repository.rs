// SQLite ClaimRepository Implementation

use crate::error::map_sqlx_error;
use crate::SqliteClaimTransaction;
use async_trait::async_trait;
use coupon_core::domain::{Claim, ClaimId};
use coupon_core::error::Result;
use coupon_core::port::{ClaimRepository, ClaimRepositoryTransaction, TransactionalClaimRepository};
use sqlx::{Sqlite, SqlitePool};

// A NULL origin never compares equal, so header-less clients only match on token
const SELECT_RECENT_CLAIM: &str = r#"
    SELECT id, origin_signal, coupon, claimed_at, client_token
    FROM claims
    WHERE (client_token = ?1 OR origin_signal = ?2)
      AND claimed_at >= ?3
    ORDER BY claimed_at DESC
    LIMIT 1
"#;

const INSERT_CLAIM: &str = r#"
    INSERT INTO claims (id, origin_signal, coupon, claimed_at, client_token)
    VALUES (?, ?, ?, ?, ?)
"#;

// Takes the write lock and lazily creates the counter
pub(crate) const ENSURE_COUNTER: &str =
    "INSERT INTO counters (name, value) VALUES (?, 0) ON CONFLICT(name) DO NOTHING";

// Atomic increment-and-fetch, returns the pre-increment value
pub(crate) const INCREMENT_COUNTER: &str = r#"
    INSERT INTO counters (name, value) VALUES (?, 1)
    ON CONFLICT(name) DO UPDATE SET value = value + 1
    RETURNING value - 1
"#;

pub(crate) async fn fetch_recent_claim<'e, E>(
    executor: E,
    origin_signal: Option<&str>,
    client_token: &str,
    since: i64,
) -> Result<Option<Claim>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, ClaimRow>(SELECT_RECENT_CLAIM)
        .bind(client_token)
        .bind(origin_signal)
        .bind(since)
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?;

    Ok(row.map(ClaimRow::into_claim))
}

pub(crate) async fn insert_claim<'e, E>(executor: E, claim: &Claim) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(INSERT_CLAIM)
        .bind(&claim.id)
        .bind(&claim.origin_signal)
        .bind(&claim.coupon)
        .bind(claim.claimed_at)
        .bind(&claim.client_token)
        .execute(executor)
        .await
        .map_err(map_sqlx_error)?;

    Ok(())
}

pub struct SqliteClaimRepository {
    pool: SqlitePool,
}

impl SqliteClaimRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClaimRepository for SqliteClaimRepository {
    async fn insert(&self, claim: &Claim) -> Result<()> {
        insert_claim(&self.pool, claim).await
    }

    async fn find_by_id(&self, id: &ClaimId) -> Result<Option<Claim>> {
        let row = sqlx::query_as::<_, ClaimRow>(
            "SELECT id, origin_signal, coupon, claimed_at, client_token FROM claims WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ClaimRow::into_claim))
    }

    async fn find_recent_claim(
        &self,
        origin_signal: Option<&str>,
        client_token: &str,
        since: i64,
    ) -> Result<Option<Claim>> {
        fetch_recent_claim(&self.pool, origin_signal, client_token, since).await
    }

    async fn list_claims(&self, limit: i64) -> Result<Vec<Claim>> {
        let rows: Vec<ClaimRow> = sqlx::query_as(
            r#"
            SELECT id, origin_signal, coupon, claimed_at, client_token
            FROM claims
            ORDER BY claimed_at ASC, rowid ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ClaimRow::into_claim).collect())
    }

    async fn count_claims(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM claims")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn counter_value(&self, name: &str) -> Result<Option<i64>> {
        sqlx::query_scalar("SELECT value FROM counters WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl TransactionalClaimRepository for SqliteClaimRepository {
    async fn begin_claim(&self, counter_name: &str) -> Result<Box<dyn ClaimRepositoryTransaction>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // First statement is a write: the transaction holds the write lock from
        // here on, so concurrent claim transactions queue on the busy timeout
        sqlx::query(ENSURE_COUNTER)
            .bind(counter_name)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(Box::new(SqliteClaimTransaction::new(tx)))
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct ClaimRow {
    id: String,
    origin_signal: Option<String>,
    coupon: String,
    claimed_at: i64,
    client_token: String,
}

impl ClaimRow {
    fn into_claim(self) -> Claim {
        Claim {
            id: self.id,
            origin_signal: self.origin_signal,
            coupon: self.coupon,
            claimed_at: self.claimed_at,
            client_token: self.client_token,
        }
    }
}
