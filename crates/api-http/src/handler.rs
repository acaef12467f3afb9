//! HTTP Handlers

use crate::error::ApiError;
use crate::signals::{client_token, origin_signal, token_cookie};
use crate::types::{ClaimResponse, HealthResponse};
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use coupon_core::application::ClaimService;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClaimService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: Arc<ClaimService>) -> Self {
        Self {
            service,
            started_at: Instant::now(),
        }
    }
}

/// GET /claim
pub async fn claim(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    let origin = origin_signal(&request);
    let token = client_token(request.headers());
    debug!(origin = ?origin, has_token = token.is_some(), "Claim request");

    let summary = state
        .service
        .claim(origin.as_deref(), token.as_deref())
        .await?;

    let mut response = Json(ClaimResponse::from(&summary.outcome)).into_response();

    if let Some(issued) = summary.issued_token() {
        match token_cookie(issued, state.service.policy().cooldown_secs()) {
            Some((name, value)) => {
                response.headers_mut().insert(name, value);
            }
            None => warn!("Issued token is not a valid header value; cookie not set"),
        }
    }

    Ok(response)
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: coupon_core::VERSION.to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
