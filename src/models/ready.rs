use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API response for readiness check
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadyResponse {
    pub status: String,
    pub message: String,
}

impl ReadyResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Service is ready".to_string(),
        }
    }
}
