//! HTTP Request/Response Types

use coupon_core::domain::ClaimOutcome;
use serde::{Deserialize, Serialize};

/// GET /claim body. Status is 200 for both grants and denials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ClaimResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            coupon: None,
            message: Some(message.into()),
        }
    }
}

impl From<&ClaimOutcome> for ClaimResponse {
    fn from(outcome: &ClaimOutcome) -> Self {
        match outcome {
            ClaimOutcome::Granted { coupon } => Self {
                success: true,
                coupon: Some(coupon.clone()),
                message: None,
            },
            ClaimOutcome::Denied { wait_seconds } => Self::failure(format!(
                "Please wait {} seconds before claiming another coupon.",
                wait_seconds
            )),
        }
    }
}

/// GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}
