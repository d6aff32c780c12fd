use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("No update")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("firmware storage failed: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "No update").into_response(),
            AppError::Validation(message) | AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "success": false,
                    "error": message
                })),
            )
                .into_response(),
            AppError::Storage(source) => {
                error!("Firmware storage error: {source:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "success": false,
                        "error": "Failed to store firmware."
                    })),
                )
                    .into_response()
            }
        }
    }
}
