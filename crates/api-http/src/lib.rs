//! HTTP API Layer
//!
//! Exposes the claim endpoint over axum. The transport owns request signals
//! (forwarded-for header, `cookieId` cookie); the core owns every decision.

pub mod error;
pub mod handler;
pub mod server;
pub mod signals;
pub mod types;

pub use handler::AppState;
pub use server::{build_router, HttpServer, HttpServerConfig};
