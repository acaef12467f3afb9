// Application Layer - Use Cases and Business Logic

pub mod claim;
pub mod constants;
pub mod identity;
pub mod maintenance;

// Re-exports
pub use claim::{ClaimPolicy, ClaimService, ClaimSummary};
pub use identity::{IdentityResolver, ResolvedIdentity};
pub use maintenance::MaintenanceScheduler;
