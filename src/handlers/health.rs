use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

use crate::{ApiResponse, AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub uptime_secs: u64,
    pub timestamp: String,
}

/// Liveness probe; the in-memory stores have no external dependency to check.
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "up".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
