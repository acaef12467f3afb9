// Claim Service - Identity resolution + arbitration

pub mod arbitrate;

#[cfg(test)]
pub(crate) mod in_memory;

use super::identity::{IdentityResolver, ResolvedIdentity};
use crate::domain::{ClaimOutcome, CouponSet, DomainError, DEFAULT_COUNTER_NAME};
use crate::error::Result;
use crate::port::{IdProvider, TimeProvider, TokenProvider, TransactionalClaimRepository};
use std::sync::Arc;
use std::time::Duration;

/// What gets dispensed and how often
#[derive(Debug, Clone)]
pub struct ClaimPolicy {
    coupons: CouponSet,
    cooldown: Duration,
    counter_name: String,
}

impl ClaimPolicy {
    pub fn new(coupons: CouponSet, cooldown: Duration) -> Result<Self> {
        if cooldown.as_millis() == 0 {
            return Err(DomainError::InvalidCooldown("cooldown must be positive".to_string()).into());
        }
        if cooldown.as_millis() > i64::MAX as u128 / 2 {
            return Err(DomainError::InvalidCooldown(format!("{:?} is too large", cooldown)).into());
        }

        Ok(Self {
            coupons,
            cooldown,
            counter_name: DEFAULT_COUNTER_NAME.to_string(),
        })
    }

    /// Use a counter other than `couponCounter` (one counter per coupon set)
    pub fn with_counter_name(mut self, name: impl Into<String>) -> Self {
        self.counter_name = name.into();
        self
    }

    pub fn coupons(&self) -> &CouponSet {
        &self.coupons
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn cooldown_ms(&self) -> i64 {
        self.cooldown.as_millis() as i64
    }

    /// Cooldown in whole seconds (rounded up), used as the token cookie max-age
    pub fn cooldown_secs(&self) -> u64 {
        self.cooldown.as_millis().div_ceil(1000) as u64
    }

    pub fn counter_name(&self) -> &str {
        &self.counter_name
    }
}

/// Result of a claim request as seen by the transport layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSummary {
    pub outcome: ClaimOutcome,
    pub identity: ResolvedIdentity,
}

impl ClaimSummary {
    /// Token the transport must persist client-side, if one was issued
    pub fn issued_token(&self) -> Option<&str> {
        self.identity
            .is_new_token
            .then_some(self.identity.client_token.as_str())
    }
}

/// Claim Service
pub struct ClaimService {
    claim_repo: Arc<dyn TransactionalClaimRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    resolver: IdentityResolver,
    policy: ClaimPolicy,
}

impl ClaimService {
    pub fn new(
        claim_repo: Arc<dyn TransactionalClaimRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        token_provider: Arc<dyn TokenProvider>,
        policy: ClaimPolicy,
    ) -> Self {
        Self {
            claim_repo,
            id_provider,
            time_provider,
            resolver: IdentityResolver::new(token_provider),
            policy,
        }
    }

    pub fn policy(&self) -> &ClaimPolicy {
        &self.policy
    }

    /// Resolve the caller's identity, then arbitrate the claim
    pub async fn claim(&self, origin: Option<&str>, token: Option<&str>) -> Result<ClaimSummary> {
        let identity = self.resolver.resolve(origin, token);
        let outcome = self
            .try_claim(identity.origin_signal.as_deref(), &identity.client_token)
            .await?;

        Ok(ClaimSummary { outcome, identity })
    }

    /// Arbitrate a claim for an already-resolved identity
    pub async fn try_claim(
        &self,
        origin_signal: Option<&str>,
        client_token: &str,
    ) -> Result<ClaimOutcome> {
        arbitrate::execute(
            self.claim_repo.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            &self.policy,
            origin_signal,
            client_token,
        )
        .await
    }
}
