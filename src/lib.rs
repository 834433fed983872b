//! Factory Operations API Library
//!
//! Products, inventory, sales, purchases, invoice payments, users and a
//! dashboard roll-up, served as a JSON API over in-memory stores.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod date_filter;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod models;
pub mod seed;
pub mod services;
pub mod status;
pub mod store;
pub mod tracing;

use axum::{http::Uri, routing::get, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::models::OrderKind;
use crate::services::AppServices;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::AppConfig>,
    pub services: AppServices,
    pub started_at: Instant,
}

impl AppState {
    /// Fresh state with empty stores sized by `config`.
    pub fn new(config: config::AppConfig) -> Self {
        let services = AppServices::in_memory(config.low_stock_threshold, &config.currency);
        Self {
            config: Arc::new(config),
            services,
            started_at: Instant::now(),
        }
    }
}

// Common response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn response_without_request_scope_has_no_request_id() {
        let response = ApiResponse::success(1);
        assert!(response.success);
        assert!(response.meta.unwrap().request_id.is_none());
    }
}

/// Every resource router, mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/sales", handlers::orders::order_routes(OrderKind::Sale))
        .nest(
            "/purchases",
            handlers::orders::order_routes(OrderKind::Purchase),
        )
        .nest("/inventory", handlers::inventory::inventory_routes())
        .nest("/products", handlers::products::product_routes())
        .nest("/payments", handlers::payments::payment_routes())
        .nest("/users", handlers::users::user_routes())
        .nest("/dashboard", handlers::dashboard::dashboard_routes())
}

/// Full application router with request ids and HTTP tracing applied.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api_v1_routes())
        .fallback(route_not_found)
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

async fn route_not_found(uri: Uri) -> errors::ServiceError {
    errors::ServiceError::NotFound(format!("no route for {}", uri.path()))
}
