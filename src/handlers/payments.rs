use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Router,
};
use serde::Deserialize;

use super::common::{paginate, parse_filter, today, DateQuery, PaginationParams};
use crate::{
    errors::ServiceError,
    models::{InvoicePayment, InvoicePaymentInput, InvoiceStatusInput},
    services::payments::{PaymentFilter, PaymentSummary},
    ApiResponse, AppState, PaginatedResponse,
};

#[derive(Debug, Default, Deserialize)]
pub struct PaymentListQuery {
    /// Invoice number or client name substring
    pub search: Option<String>,
    /// Pending, Completed, Failed or all
    pub status: Option<String>,
}

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(record_payment))
        .route("/summary", get(payment_summary))
        .route("/:id", get(get_payment))
        .route("/:id/status", put(update_payment_status))
}

async fn list_payments(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<PaymentListQuery>,
    Query(dates): Query<DateQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<InvoicePayment>>>, ServiceError> {
    let filter = PaymentFilter {
        search: query.search,
        status: parse_filter(query.status.as_deref(), "status")?,
        date: dates.to_filter()?,
    };
    let (page, limit) = pagination.resolve(
        state.config.api_default_page_size,
        state.config.api_max_page_size,
    );

    let payments = state.services.payments.list_payments(&filter, today());
    Ok(Json(ApiResponse::success(paginate(payments, page, limit))))
}

async fn record_payment(
    State(state): State<AppState>,
    Json(request): Json<InvoicePaymentInput>,
) -> Result<(StatusCode, Json<ApiResponse<InvoicePayment>>), ServiceError> {
    let payment = state.services.payments.record_payment(request, today())?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(payment))))
}

async fn payment_summary(State(state): State<AppState>) -> Json<ApiResponse<PaymentSummary>> {
    Json(ApiResponse::success(state.services.payments.summary(today())))
}

async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<InvoicePayment>>, ServiceError> {
    let payment = state.services.payments.get_payment(id)?;
    Ok(Json(ApiResponse::success(payment)))
}

async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<InvoiceStatusInput>,
) -> Result<Json<ApiResponse<InvoicePayment>>, ServiceError> {
    let payment = state.services.payments.update_status(id, request.status)?;
    Ok(Json(ApiResponse::success(payment)))
}
