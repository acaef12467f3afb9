// Claim Arbitration Use Case

use super::ClaimPolicy;
use crate::domain::{Claim, ClaimOutcome};
use crate::error::Result;
use crate::port::{IdProvider, TimeProvider, Transaction, TransactionalClaimRepository};
use tracing::{debug, info};

/// Execute one claim attempt (single transaction, serialized by the store)
///
/// # Arguments
///
/// * `claim_repo` - Transactional claim repository
/// * `id_provider` - Claim ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `policy` - Coupons, counter name and cooldown window
/// * `origin_signal` - Network-origin signal, if any
/// * `client_token` - Durable client token
pub async fn execute(
    claim_repo: &dyn TransactionalClaimRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    policy: &ClaimPolicy,
    origin_signal: Option<&str>,
    client_token: &str,
) -> Result<ClaimOutcome> {
    // Holds the store's write lock until commit/rollback
    let mut tx = claim_repo.begin_claim(policy.counter_name()).await?;

    // Read the clock only once the lock is held
    let now = time_provider.now_millis();
    let cutoff = now - policy.cooldown_ms();

    if let Some(recent) = tx
        .find_recent_claim(origin_signal, client_token, cutoff)
        .await?
    {
        tx.rollback().await?;

        let wait_seconds = recent.wait_seconds(policy.cooldown_ms(), now);
        debug!(
            origin = ?origin_signal,
            matched_claim = %recent.id,
            wait_seconds,
            "Claim denied: identity in cooldown"
        );
        return Ok(ClaimOutcome::Denied { wait_seconds });
    }

    let previous = tx.increment_counter(policy.counter_name()).await?;
    let coupon = policy.coupons().select(previous)?.to_string();

    let claim = Claim::new(
        id_provider.generate_id(),
        origin_signal.map(str::to_string),
        coupon.clone(),
        now,
        client_token.to_string(),
    );
    tx.insert(&claim).await?;
    tx.commit().await?;

    info!(
        claim_id = %claim.id,
        coupon = %coupon,
        counter = previous,
        "Coupon granted"
    );

    Ok(ClaimOutcome::Granted { coupon })
}

#[cfg(test)]
mod tests {
    use super::super::in_memory::InMemoryClaimRepository;
    use super::*;
    use crate::domain::CouponSet;
    use crate::error::AppError;
    use crate::port::transaction::MockTransactionalClaimRepository;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;

    struct MockTimeProvider {
        current_time: AtomicI64,
    }

    impl MockTimeProvider {
        fn at(ms: i64) -> Self {
            Self {
                current_time: AtomicI64::new(ms),
            }
        }

        fn advance(&self, ms: i64) {
            self.current_time.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl TimeProvider for MockTimeProvider {
        fn now_millis(&self) -> i64 {
            self.current_time.load(Ordering::SeqCst)
        }
    }

    struct SequentialIds(AtomicI64);

    impl IdProvider for SequentialIds {
        fn generate_id(&self) -> String {
            format!("claim-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn policy() -> ClaimPolicy {
        ClaimPolicy::new(CouponSet::default(), Duration::from_secs(60)).unwrap()
    }

    #[tokio::test]
    async fn test_round_robin_across_identities() {
        let repo = InMemoryClaimRepository::new();
        let ids = SequentialIds(AtomicI64::new(0));
        let clock = MockTimeProvider::at(1_000_000);
        let policy = policy();

        let mut issued = vec![];
        for i in 0..4 {
            let token = format!("token-{}", i);
            let origin = format!("10.0.0.{}", i);
            let outcome = execute(&repo, &ids, &clock, &policy, Some(&origin), &token)
                .await
                .unwrap();
            issued.push(outcome.coupon().unwrap().to_string());
        }

        assert_eq!(issued, vec!["COUPON10", "COUPON20", "COUPON30", "COUPON10"]);
        assert_eq!(repo.counter("couponCounter").await, Some(4));
        assert_eq!(repo.claims().await.len(), 4);
    }

    #[tokio::test]
    async fn test_repeat_claim_denied_without_mutation() {
        let repo = InMemoryClaimRepository::new();
        let ids = SequentialIds(AtomicI64::new(0));
        let clock = MockTimeProvider::at(1_000_000);
        let policy = policy();

        let first = execute(&repo, &ids, &clock, &policy, Some("1.1.1.1"), "tok")
            .await
            .unwrap();
        assert!(first.is_granted());

        clock.advance(15_500);
        let second = execute(&repo, &ids, &clock, &policy, Some("1.1.1.1"), "tok")
            .await
            .unwrap();
        assert_eq!(second, ClaimOutcome::Denied { wait_seconds: 45 });

        assert_eq!(repo.counter("couponCounter").await, Some(1));
        assert_eq!(repo.claims().await.len(), 1);
    }

    #[tokio::test]
    async fn test_matching_origin_alone_denies() {
        let repo = InMemoryClaimRepository::new();
        let ids = SequentialIds(AtomicI64::new(0));
        let clock = MockTimeProvider::at(1_000_000);
        let policy = policy();

        execute(&repo, &ids, &clock, &policy, Some("1.1.1.1"), "tok-a")
            .await
            .unwrap();
        let outcome = execute(&repo, &ids, &clock, &policy, Some("1.1.1.1"), "tok-b")
            .await
            .unwrap();
        assert!(!outcome.is_granted());
    }

    #[tokio::test]
    async fn test_matching_token_alone_denies() {
        let repo = InMemoryClaimRepository::new();
        let ids = SequentialIds(AtomicI64::new(0));
        let clock = MockTimeProvider::at(1_000_000);
        let policy = policy();

        execute(&repo, &ids, &clock, &policy, Some("1.1.1.1"), "tok")
            .await
            .unwrap();
        let outcome = execute(&repo, &ids, &clock, &policy, Some("2.2.2.2"), "tok")
            .await
            .unwrap();
        assert!(!outcome.is_granted());
    }

    #[tokio::test]
    async fn test_absent_origins_do_not_match_each_other() {
        let repo = InMemoryClaimRepository::new();
        let ids = SequentialIds(AtomicI64::new(0));
        let clock = MockTimeProvider::at(1_000_000);
        let policy = policy();

        let a = execute(&repo, &ids, &clock, &policy, None, "tok-a")
            .await
            .unwrap();
        let b = execute(&repo, &ids, &clock, &policy, None, "tok-b")
            .await
            .unwrap();
        assert!(a.is_granted());
        assert!(b.is_granted());
    }

    #[tokio::test]
    async fn test_cooldown_expiry_continues_rotation() {
        let repo = InMemoryClaimRepository::new();
        let ids = SequentialIds(AtomicI64::new(0));
        let clock = MockTimeProvider::at(1_000_000);
        let policy = policy();

        let first = execute(&repo, &ids, &clock, &policy, Some("1.1.1.1"), "tok")
            .await
            .unwrap();
        execute(&repo, &ids, &clock, &policy, Some("9.9.9.9"), "other")
            .await
            .unwrap();

        // Inclusive cutoff: still blocked exactly at the window edge
        clock.advance(60_000);
        let edge = execute(&repo, &ids, &clock, &policy, Some("1.1.1.1"), "tok")
            .await
            .unwrap();
        assert_eq!(edge, ClaimOutcome::Denied { wait_seconds: 1 });

        clock.advance(1);
        let again = execute(&repo, &ids, &clock, &policy, Some("1.1.1.1"), "tok")
            .await
            .unwrap();

        assert_eq!(first.coupon(), Some("COUPON10"));
        assert_eq!(again.coupon(), Some("COUPON30"));
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let mut repo = MockTransactionalClaimRepository::new();
        repo.expect_begin_claim()
            .times(1)
            .returning(|_| Err(AppError::Database("connection refused".to_string())));

        let ids = SequentialIds(AtomicI64::new(0));
        let clock = MockTimeProvider::at(1_000_000);

        let err = execute(&repo, &ids, &clock, &policy(), Some("1.1.1.1"), "tok")
            .await
            .unwrap_err();
        assert!(err.is_storage());
    }
}
