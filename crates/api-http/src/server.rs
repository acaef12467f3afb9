//! HTTP Server

use crate::error::ServerError;
use crate::handler::{self, AppState};
use axum::routing::get;
use axum::Router;
use coupon_core::application::ClaimService;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
const DEFAULT_HTTP_PORT: u16 = 3000;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Routes: GET /claim, GET /health
pub fn build_router(service: Arc<ClaimService>) -> Router {
    Router::new()
        .route("/claim", get(handler::claim))
        .route("/health", get(handler::health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(service))
}

/// HTTP Server
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, service: Arc<ClaimService>) -> Self {
        Self {
            config,
            router: build_router(service),
        }
    }

    /// Bind the listener. Port 0 picks a free port.
    pub async fn bind(self) -> Result<BoundServer, ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(BoundServer {
            listener,
            router: self.router,
        })
    }
}

/// Server with a bound listener, ready to serve
pub struct BoundServer {
    listener: TcpListener,
    router: Router,
}

impl BoundServer {
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(addr = %self.local_addr()?, "Coupon dispenser listening");

        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}
