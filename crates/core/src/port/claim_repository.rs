// Claim Repository Port (Interface)

use crate::domain::{Claim, ClaimId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for claim history and rotation counters
///
/// Reads here run outside any claim transaction; the arbiter goes through
/// [`TransactionalClaimRepository`](super::TransactionalClaimRepository).
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    /// Insert a new claim
    async fn insert(&self, claim: &Claim) -> Result<()>;

    /// Find claim by ID
    async fn find_by_id(&self, id: &ClaimId) -> Result<Option<Claim>>;

    /// Most recent claim at or after `since` (epoch ms) whose origin OR token matches.
    /// An absent origin only matches on token.
    async fn find_recent_claim(
        &self,
        origin_signal: Option<&str>,
        client_token: &str,
        since: i64,
    ) -> Result<Option<Claim>>;

    /// Claims ordered by issuance (oldest first)
    async fn list_claims(&self, limit: i64) -> Result<Vec<Claim>>;

    /// Total number of recorded claims
    async fn count_claims(&self) -> Result<i64>;

    /// Current value of a rotation counter, None if it was never created
    async fn counter_value(&self, name: &str) -> Result<Option<i64>>;
}
