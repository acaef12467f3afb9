// Coupon Rotation Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Lookup key of the singleton rotation counter
pub const DEFAULT_COUNTER_NAME: &str = "couponCounter";

/// Ordered, non-empty list of coupon codes handed out round-robin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CouponSet(Vec<String>);

impl CouponSet {
    pub fn new(codes: Vec<String>) -> Result<Self> {
        if codes.is_empty() {
            return Err(DomainError::EmptyCouponSet);
        }

        for (index, code) in codes.iter().enumerate() {
            if code.trim().is_empty() {
                return Err(DomainError::InvalidCoupon {
                    index,
                    reason: "coupon code is blank".to_string(),
                });
            }
            if code.len() > 128 {
                return Err(DomainError::InvalidCoupon {
                    index,
                    reason: format!("coupon code too long ({} > 128)", code.len()),
                });
            }
        }

        Ok(Self(codes))
    }

    /// Coupon issued for a given pre-increment counter value
    pub fn select(&self, counter_value: i64) -> Result<&str> {
        if counter_value < 0 {
            return Err(DomainError::CounterOutOfRange(counter_value));
        }
        let index = (counter_value as u64 % self.0.len() as u64) as usize;
        Ok(&self.0[index])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for CouponSet {
    fn default() -> Self {
        Self(vec![
            "COUPON10".to_string(),
            "COUPON20".to_string(),
            "COUPON30".to_string(),
        ])
    }
}

impl TryFrom<Vec<String>> for CouponSet {
    type Error = DomainError;

    fn try_from(codes: Vec<String>) -> Result<Self> {
        Self::new(codes)
    }
}

impl From<CouponSet> for Vec<String> {
    fn from(set: CouponSet) -> Self {
        set.0
    }
}

/// Persistent dispensing progress. `value` only ever grows, by one per grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationCounter {
    pub name: String,
    pub value: i64,
}

impl RotationCounter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: 0,
        }
    }
}
