use anyhow::Context;
use http::HeaderValue;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use tracing::{error, info, warn};

use factory_ops_api as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match api::config::load_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            let fallback = api::config::AppConfig::default();
            api::config::init_tracing(fallback.log_level(), fallback.log_json);
            error!(error = %err, "failed to load configuration");
            return Err(err).context("failed to load configuration");
        }
    };
    api::config::init_tracing(cfg.log_level(), cfg.log_json);
    info!(
        run_env = %api::config::selected_run_env(),
        config_dir_found = std::path::Path::new(api::config::CONFIG_DIR).exists(),
        "configuration loaded"
    );

    let cors_layer = build_cors_layer(&cfg)?;
    let addr = cfg.bind_address();

    let app_state = api::AppState::new(cfg.clone());
    if cfg.seed_demo_data {
        api::seed::load_demo_data(&app_state.services).context("failed to seed demo data")?;
    }

    let app = api::app_router(app_state)
        // Apply compression
        .layer(CompressionLayer::new())
        // Apply CORS
        .layer(cors_layer);

    info!(
        environment = %cfg.environment,
        currency = %cfg.currency,
        "factory-ops-api listening on http://{}",
        addr
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

/// Build CORS layer from config
fn build_cors_layer(cfg: &api::config::AppConfig) -> anyhow::Result<CorsLayer> {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any))
    } else if cfg.should_allow_permissive_cors() {
        info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Ok(CorsLayer::permissive())
    } else {
        error!("Missing CORS configuration detected; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true");
        anyhow::bail!(
            "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
        )
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
