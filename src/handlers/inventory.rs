use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;

use super::common::{paginate, parse_filter, today, DateQuery, PaginationParams};
use crate::{
    errors::ServiceError,
    models::{InventoryItem, InventoryItemInput},
    services::inventory::{InventoryFilter, InventorySummary},
    ApiResponse, AppState, PaginatedResponse,
};

#[derive(Debug, Default, Deserialize)]
pub struct InventoryListQuery {
    pub search: Option<String>,
    /// Stock location name or all
    pub stock: Option<String>,
}

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory).post(create_inventory))
        .route("/summary", get(inventory_summary))
        .route(
            "/:id",
            get(get_inventory)
                .put(update_inventory)
                .delete(delete_inventory),
        )
}

async fn list_inventory(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<InventoryListQuery>,
    Query(dates): Query<DateQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<InventoryItem>>>, ServiceError> {
    let filter = InventoryFilter {
        search: query.search,
        stock: parse_filter(query.stock.as_deref(), "stock")?,
        date: dates.to_filter()?,
    };
    let (page, limit) = pagination.resolve(
        state.config.api_default_page_size,
        state.config.api_max_page_size,
    );

    let items = state.services.inventory.list_items(&filter, today());
    Ok(Json(ApiResponse::success(paginate(items, page, limit))))
}

async fn create_inventory(
    State(state): State<AppState>,
    Json(request): Json<InventoryItemInput>,
) -> Result<(StatusCode, Json<ApiResponse<InventoryItem>>), ServiceError> {
    let item = state.services.inventory.create_item(request, today())?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

async fn inventory_summary(State(state): State<AppState>) -> Json<ApiResponse<InventorySummary>> {
    Json(ApiResponse::success(state.services.inventory.summary()))
}

async fn get_inventory(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<InventoryItem>>, ServiceError> {
    let item = state.services.inventory.get_item(id)?;
    Ok(Json(ApiResponse::success(item)))
}

async fn update_inventory(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<InventoryItemInput>,
) -> Result<Json<ApiResponse<InventoryItem>>, ServiceError> {
    let item = state.services.inventory.update_item(id, request)?;
    Ok(Json(ApiResponse::success(item)))
}

async fn delete_inventory(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ServiceError> {
    state.services.inventory.delete_item(id)?;
    Ok(StatusCode::NO_CONTENT)
}
