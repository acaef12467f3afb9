// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Coupon set must contain at least one coupon")]
    EmptyCouponSet,

    #[error("Invalid coupon code at position {index}: {reason}")]
    InvalidCoupon { index: usize, reason: String },

    #[error("Invalid cooldown window: {0}")]
    InvalidCooldown(String),

    #[error("Counter value out of range: {0}")]
    CounterOutOfRange(i64),
}

pub type Result<T> = std::result::Result<T, DomainError>;
