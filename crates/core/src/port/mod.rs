// Port Layer - Interfaces for external dependencies

pub mod claim_repository;
pub mod id_provider; // For deterministic testing
pub mod maintenance;
pub mod time_provider;
pub mod token_provider;
pub mod transaction;

// Re-exports
pub use claim_repository::ClaimRepository;
pub use id_provider::IdProvider;
pub use maintenance::{Maintenance, MaintenanceConfig, MaintenanceStats};
pub use time_provider::TimeProvider;
pub use token_provider::TokenProvider;
pub use transaction::{ClaimRepositoryTransaction, Transaction, TransactionalClaimRepository};
