// Coupon Infrastructure - SQLite Adapter
// Implements: ClaimRepository, TransactionalClaimRepository, Maintenance

mod claim_repository;
mod connection;
mod error;
mod maintenance_impl;
mod migration;
mod transaction;

pub use claim_repository::SqliteClaimRepository;
pub use connection::create_pool;
pub use maintenance_impl::SqliteMaintenance;
pub use migration::run_migrations;
pub use transaction::SqliteClaimTransaction;

// Note: sqlx::Error conversion is handled by map_sqlx_error (error.rs)
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
