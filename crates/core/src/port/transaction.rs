// Transaction port for atomic claim arbitration

use crate::domain::Claim;
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional claim operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionalClaimRepository: Send + Sync {
    /// Begin a claim transaction against the counter `counter_name`.
    ///
    /// Implementations must serialize claim transactions with each other
    /// from the moment this returns until commit/rollback, and must create
    /// the counter with value 0 if it does not exist yet.
    async fn begin_claim(&self, counter_name: &str) -> Result<Box<dyn ClaimRepositoryTransaction>>;
}

/// Claim operations within a transaction
#[async_trait]
pub trait ClaimRepositoryTransaction: Transaction {
    /// Most recent matching claim at or after `since` (within transaction)
    async fn find_recent_claim(
        &mut self,
        origin_signal: Option<&str>,
        client_token: &str,
        since: i64,
    ) -> Result<Option<Claim>>;

    /// Atomically increment the counter, returning the value before the increment
    async fn increment_counter(&mut self, counter_name: &str) -> Result<i64>;

    /// Insert claim (within transaction)
    async fn insert(&mut self, claim: &Claim) -> Result<()>;
}
