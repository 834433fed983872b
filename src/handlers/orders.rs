use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Router,
};
use serde::Deserialize;

use super::common::{paginate, parse_filter, today, DateQuery, PaginationParams};
use crate::{
    errors::ServiceError,
    models::{CreateOrderInput, FulfillmentInput, Order, OrderKind, PaymentInput, UpdateOrderItemsInput},
    services::orders::{OrderFilter, OrderSummary},
    ApiResponse, AppState, PaginatedResponse,
};

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    /// Case-insensitive order number substring
    pub search: Option<String>,
    /// Pending, Completed or all
    pub fulfillment_status: Option<String>,
    /// Unpaid, Partially Paid, Fully Paid or all
    pub payment_status: Option<String>,
}

/// Routes for one order ledger; `kind` picks sales or purchases.
pub fn order_routes(kind: OrderKind) -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/summary", get(order_summary))
        .route("/:id", get(get_order).delete(delete_order))
        .route("/:id/items", put(update_order_items))
        .route("/:id/items/:line/fulfillment", post(record_fulfillment))
        .route("/:id/payments", post(record_payment))
        .layer(Extension(kind))
}

async fn list_orders(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<OrderListQuery>,
    Query(dates): Query<DateQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<Order>>>, ServiceError> {
    let filter = OrderFilter {
        search: query.search,
        fulfillment_status: parse_filter(
            query.fulfillment_status.as_deref(),
            "fulfillment_status",
        )?,
        payment_status: parse_filter(query.payment_status.as_deref(), "payment_status")?,
        date: dates.to_filter()?,
    };
    let (page, limit) = pagination.resolve(
        state.config.api_default_page_size,
        state.config.api_max_page_size,
    );

    let orders = state.services.orders(kind).list_orders(&filter, today());
    Ok(Json(ApiResponse::success(paginate(orders, page, limit))))
}

async fn create_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    Json(request): Json<CreateOrderInput>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ServiceError> {
    let order = state.services.orders(kind).create_order(request, today())?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

async fn order_summary(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
) -> Json<ApiResponse<OrderSummary>> {
    Json(ApiResponse::success(state.services.orders(kind).summary()))
}

async fn get_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Order>>, ServiceError> {
    let order = state.services.orders(kind).get_order(id)?;
    Ok(Json(ApiResponse::success(order)))
}

async fn delete_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ServiceError> {
    state.services.orders(kind).delete_order(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_order_items(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateOrderItemsInput>,
) -> Result<Json<ApiResponse<Order>>, ServiceError> {
    let order = state.services.orders(kind).update_items(id, request)?;
    Ok(Json(ApiResponse::success(order)))
}

async fn record_fulfillment(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    Path((id, line)): Path<(u64, usize)>,
    Json(request): Json<FulfillmentInput>,
) -> Result<Json<ApiResponse<Order>>, ServiceError> {
    let order = state
        .services
        .orders(kind)
        .record_fulfillment(id, line, request.quantity)?;
    Ok(Json(ApiResponse::success(order)))
}

async fn record_payment(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    Path(id): Path<u64>,
    Json(request): Json<PaymentInput>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ServiceError> {
    let order = state
        .services
        .orders(kind)
        .record_payment(id, request, today())?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}
