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
    models::{Product, ProductInput},
    services::products::{ProductFilter, ProductSummary},
    ApiResponse, AppState, PaginatedResponse,
};

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub search: Option<String>,
    /// Raw Material, Semi-Final, Final Product or all
    pub category: Option<String>,
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/summary", get(product_summary))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

async fn list_products(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<ProductListQuery>,
    Query(dates): Query<DateQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<Product>>>, ServiceError> {
    let filter = ProductFilter {
        search: query.search,
        category: parse_filter(query.category.as_deref(), "category")?,
        date: dates.to_filter()?,
    };
    let (page, limit) = pagination.resolve(
        state.config.api_default_page_size,
        state.config.api_max_page_size,
    );

    let products = state.services.products.list_products(&filter, today());
    Ok(Json(ApiResponse::success(paginate(products, page, limit))))
}

async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<ProductInput>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ServiceError> {
    let product = state.services.products.create_product(request, today())?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

async fn product_summary(State(state): State<AppState>) -> Json<ApiResponse<ProductSummary>> {
    Json(ApiResponse::success(state.services.products.summary()))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Product>>, ServiceError> {
    let product = state.services.products.get_product(id)?;
    Ok(Json(ApiResponse::success(product)))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<ProductInput>,
) -> Result<Json<ApiResponse<Product>>, ServiceError> {
    let product = state.services.products.update_product(id, request)?;
    Ok(Json(ApiResponse::success(product)))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ServiceError> {
    state.services.products.delete_product(id)?;
    Ok(StatusCode::NO_CONTENT)
}
