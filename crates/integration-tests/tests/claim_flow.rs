//! End-to-end claim arbitration against SQLite

use coupon_core::domain::ClaimOutcome;
use coupon_core::port::time_provider::SystemTimeProvider;
use coupon_core::port::ClaimRepository;
use coupon_infra_sqlite::SqliteClaimRepository;
use coupon_integration_tests::{default_policy, memory_pool, policy, service, ManualClock, TempDb};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_round_robin_regardless_of_identity() {
    let pool = memory_pool().await;
    let clock = ManualClock::at(1_700_000_000_000);
    let service = service(pool, clock, default_policy());

    let mut issued = vec![];
    for i in 0..7 {
        let origin = format!("198.51.100.{}", i);
        let summary = service.claim(Some(&origin), None).await.unwrap();
        issued.push(summary.outcome.coupon().unwrap().to_string());
    }

    assert_eq!(
        issued,
        vec!["COUPON10", "COUPON20", "COUPON30", "COUPON10", "COUPON20", "COUPON30", "COUPON10"]
    );
}

#[tokio::test]
async fn test_cooldown_then_expiry() {
    let pool = memory_pool().await;
    let clock = ManualClock::at(1_700_000_000_000);
    let repo = SqliteClaimRepository::new(pool.clone());
    let service = service(pool, clock.clone(), default_policy());

    let first = service.claim(Some("203.0.113.5"), None).await.unwrap();
    assert_eq!(first.outcome.coupon(), Some("COUPON10"));
    let token = first.identity.client_token.clone();

    clock.advance(Duration::from_millis(20_250));
    let denied = service
        .claim(Some("203.0.113.5"), Some(&token))
        .await
        .unwrap();
    assert_eq!(denied.outcome, ClaimOutcome::Denied { wait_seconds: 40 });

    // Someone else claims meanwhile, the rotation moves on
    let other = service.claim(Some("203.0.113.99"), None).await.unwrap();
    assert_eq!(other.outcome.coupon(), Some("COUPON20"));

    clock.advance(Duration::from_secs(40));
    let again = service
        .claim(Some("203.0.113.5"), Some(&token))
        .await
        .unwrap();
    assert_eq!(again.outcome.coupon(), Some("COUPON30"));

    assert_eq!(repo.count_claims().await.unwrap(), 3);
    assert_eq!(repo.counter_value("couponCounter").await.unwrap(), Some(3));
}

#[tokio::test]
async fn test_wait_seconds_bounded_by_window() {
    let pool = memory_pool().await;
    let clock = ManualClock::at(1_700_000_000_000);
    let service = service(pool, clock.clone(), policy(&["ONLY"], Duration::from_secs(90)));

    service.claim(Some("192.0.2.1"), Some("tok")).await.unwrap();

    // Deltas land at 0s, 1s, 45s and 89.999s into the window
    for (delta_ms, expected) in [(0, 90), (1_000, 89), (44_000, 45), (44_999, 1)] {
        clock.advance(Duration::from_millis(delta_ms));
        let summary = service.claim(Some("192.0.2.1"), Some("tok")).await.unwrap();
        assert_eq!(
            summary.outcome,
            ClaimOutcome::Denied {
                wait_seconds: expected
            }
        );
    }
}

#[tokio::test]
async fn test_shared_origin_blocks_fresh_token() {
    let pool = memory_pool().await;
    let clock = ManualClock::at(1_700_000_000_000);
    let service = service(pool, clock, default_policy());

    let first = service.claim(Some("192.0.2.10"), None).await.unwrap();
    assert!(first.outcome.is_granted());

    // Same origin, cookie cleared
    let second = service.claim(Some("192.0.2.10"), None).await.unwrap();
    assert!(!second.outcome.is_granted());
    assert!(second.identity.is_new_token);
}

#[tokio::test]
async fn test_same_token_new_origin_blocked() {
    let pool = memory_pool().await;
    let clock = ManualClock::at(1_700_000_000_000);
    let service = service(pool, clock, default_policy());

    service.claim(Some("192.0.2.10"), Some("roaming")).await.unwrap();
    let moved = service
        .claim(Some("198.51.100.77"), Some("roaming"))
        .await
        .unwrap();
    assert!(!moved.outcome.is_granted());
}

#[tokio::test]
async fn test_denial_writes_nothing() {
    let pool = memory_pool().await;
    let clock = ManualClock::at(1_700_000_000_000);
    let repo = SqliteClaimRepository::new(pool.clone());
    let service = service(pool, clock, default_policy());

    service.claim(None, Some("tok")).await.unwrap();
    for _ in 0..5 {
        service.claim(None, Some("tok")).await.unwrap();
    }

    assert_eq!(repo.count_claims().await.unwrap(), 1);
    assert_eq!(repo.counter_value("couponCounter").await.unwrap(), Some(1));
}

#[tokio::test]
async fn test_claim_record_contents() {
    let pool = memory_pool().await;
    let clock = ManualClock::at(1_700_000_000_000);
    let repo = SqliteClaimRepository::new(pool.clone());
    let service = service(pool, clock, default_policy());

    let summary = service.claim(Some("192.0.2.44"), None).await.unwrap();

    let claims = repo.list_claims(10).await.unwrap();
    assert_eq!(claims.len(), 1);
    let claim = &claims[0];
    assert_eq!(claim.origin_signal.as_deref(), Some("192.0.2.44"));
    assert_eq!(claim.client_token, summary.identity.client_token);
    assert_eq!(claim.coupon, "COUPON10");
    assert_eq!(claim.claimed_at, 1_700_000_000_000);
}

/// Counter state survives a restart
#[tokio::test]
async fn test_rotation_continues_after_restart() {
    let db = TempDb::new().await;

    let before = service(db.pool.clone(), Arc::new(SystemTimeProvider), default_policy());
    for i in 0..2 {
        let token = format!("before-{}", i);
        before.claim(None, Some(&token)).await.unwrap();
    }
    drop(before);
    db.pool.close().await;

    let db = TempDb {
        pool: TempDb::open(&db.path).await,
        path: db.path,
    };
    let after = service(db.pool.clone(), Arc::new(SystemTimeProvider), default_policy());
    let summary = after.claim(None, Some("after")).await.unwrap();
    assert_eq!(summary.outcome.coupon(), Some("COUPON30"));

    let repo = SqliteClaimRepository::new(db.pool.clone());
    assert_eq!(repo.count_claims().await.unwrap(), 3);

    db.cleanup().await;
}
