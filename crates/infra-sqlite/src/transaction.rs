// SQLite Claim Transaction Implementation

use crate::claim_repository::{fetch_recent_claim, insert_claim, INCREMENT_COUNTER};
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use coupon_core::domain::Claim;
use coupon_core::error::Result;
use coupon_core::port::{ClaimRepositoryTransaction, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

/// Open claim transaction. Dropping it without commit rolls back.
pub struct SqliteClaimTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteClaimTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteClaimTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl ClaimRepositoryTransaction for SqliteClaimTransaction {
    async fn find_recent_claim(
        &mut self,
        origin_signal: Option<&str>,
        client_token: &str,
        since: i64,
    ) -> Result<Option<Claim>> {
        fetch_recent_claim(&mut *self.tx, origin_signal, client_token, since).await
    }

    async fn increment_counter(&mut self, counter_name: &str) -> Result<i64> {
        sqlx::query_scalar(INCREMENT_COUNTER)
            .bind(counter_name)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert(&mut self, claim: &Claim) -> Result<()> {
        insert_claim(&mut *self.tx, claim).await
    }
}
