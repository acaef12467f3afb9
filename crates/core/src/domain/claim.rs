// Claim Domain Model

use serde::{Deserialize, Serialize};

/// Claim ID (UUID v4)
pub type ClaimId = String;

/// Network-origin signal as forwarded by the transport layer (soft, unverified)
pub type OriginSignal = String;

/// Durable per-client identifier (cookie value)
pub type ClientToken = String;

/// One successful coupon issuance. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub origin_signal: Option<OriginSignal>,
    pub coupon: String,
    pub claimed_at: i64, // epoch ms
    pub client_token: ClientToken,
}

impl Claim {
    pub fn new(
        id: ClaimId,
        origin_signal: Option<OriginSignal>,
        coupon: impl Into<String>,
        claimed_at: i64,
        client_token: ClientToken,
    ) -> Self {
        Self {
            id,
            origin_signal,
            coupon: coupon.into(),
            claimed_at,
            client_token,
        }
    }

    /// Whole seconds left before the identity that made this claim may claim again.
    ///
    /// Rounded up, never below 1 and never above the window itself (guards
    /// against a claim timestamp written by a clock that ran ahead).
    pub fn wait_seconds(&self, cooldown_ms: i64, now: i64) -> u64 {
        let remaining_ms = self.claimed_at + cooldown_ms - now;
        let max_secs = ceil_div_1000(cooldown_ms).max(1);
        ceil_div_1000(remaining_ms).clamp(1, max_secs) as u64
    }

    /// Whether this claim still blocks its identity at `now`.
    pub fn is_within_cooldown(&self, cooldown_ms: i64, now: i64) -> bool {
        self.claimed_at >= now - cooldown_ms
    }
}

fn ceil_div_1000(ms: i64) -> i64 {
    if ms <= 0 {
        0
    } else {
        (ms + 999) / 1000
    }
}

/// Result of a claim attempt. A denial is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Granted { coupon: String },
    Denied { wait_seconds: u64 },
}

impl ClaimOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, ClaimOutcome::Granted { .. })
    }

    pub fn coupon(&self) -> Option<&str> {
        match self {
            ClaimOutcome::Granted { coupon } => Some(coupon),
            ClaimOutcome::Denied { .. } => None,
        }
    }
}

impl std::fmt::Display for ClaimOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimOutcome::Granted { coupon } => write!(f, "GRANTED({})", coupon),
            ClaimOutcome::Denied { wait_seconds } => write!(f, "DENIED({}s)", wait_seconds),
        }
    }
}
