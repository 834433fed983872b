#![allow(dead_code)]

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use factory_ops_api::{app_router, config::AppConfig, seed, AppState};

/// Helper harness driving the full router over fresh in-memory state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with empty stores.
    pub fn new() -> Self {
        Self::with_config(AppConfig {
            environment: "test".to_string(),
            cors_allow_any_origin: true,
            ..AppConfig::default()
        })
    }

    /// Same as [`TestApp::new`] with the demo records loaded.
    pub fn seeded() -> Self {
        let app = Self::new();
        seed::load_demo_data(&app.state.services).expect("seed demo data");
        app
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(config);
        Self {
            router: app_router(state.clone()),
            state,
        }
    }

    /// Send a request against the router, JSON-encoding `body` when present.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Decimals serialize as strings; compare them numerically.
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal serialized as string")
        .parse()
        .expect("valid decimal")
}
