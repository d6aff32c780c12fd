mod api;
mod calibration;
mod config;
mod constants;
mod error;
mod firmware;
mod store;
mod types;
mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::fs;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{
    dashboard, fetch_firmware, get_settings, healthz, ingest_data, latest_data, update_settings,
    upload_firmware,
};
use crate::config::Config;
use crate::types::AppState;
use crate::utils::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cfg = Arc::new(Config::from_env()?);
    fs::create_dir_all(&cfg.uploads_dir)
        .await
        .with_context(|| format!("Failed to create {}", cfg.uploads_dir.display()))?;

    let state = AppState::new(cfg.clone());

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.listen_addr))?;

    info!("Well relay listening on http://{}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let cfg = state.cfg.clone();
    Router::new()
        .route("/", get(dashboard))
        .route("/healthz", get(healthz))
        .route("/api/data", get(latest_data).post(ingest_data))
        .route("/api/settings", get(get_settings).post(update_settings))
        .route(
            "/upload",
            post(upload_firmware).layer(DefaultBodyLimit::max(cfg.body_limit())),
        )
        .route("/update", get(fetch_firmware))
        .fallback_service(ServeDir::new(&cfg.public_dir))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    use crate::firmware::scratch_dir;

    fn test_router() -> Router {
        let root = scratch_dir("router");
        build_router(AppState::new(Arc::new(Config {
            listen_addr: "127.0.0.1:0".to_string(),
            uploads_dir: root.join("uploads"),
            public_dir: root.join("public"),
            max_firmware_bytes: 1024,
        })))
    }

    #[tokio::test]
    async fn preflight_from_another_origin_is_allowed() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/settings")
            .header(header::ORIGIN, "http://dashboard.local:8080")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn cross_origin_reads_carry_allow_origin() {
        let request = Request::builder()
            .uri("/api/data")
            .header(header::ORIGIN, "http://dashboard.local:8080")
            .body(Body::empty())
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
