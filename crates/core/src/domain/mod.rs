// Domain Layer - Pure business logic and entities

pub mod claim;
pub mod coupon;
pub mod error;

// Re-exports
pub use claim::{Claim, ClaimId, ClaimOutcome, ClientToken, OriginSignal};
pub use coupon::{CouponSet, RotationCounter, DEFAULT_COUNTER_NAME};
pub use error::DomainError;
