use axum::{extract::State, response::Json, routing::get, Router};

use super::common::today;
use crate::{services::dashboard::DashboardOverview, ApiResponse, AppState};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

async fn dashboard(State(state): State<AppState>) -> Json<ApiResponse<DashboardOverview>> {
    Json(ApiResponse::success(state.services.dashboard.overview(today())))
}
