use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{info, warn};

use crate::constants::{DASHBOARD_INDEX_FILE, FIRMWARE_CONTENT_DISPOSITION, FIRMWARE_FIELD_NAME};
use crate::error::AppError;
use crate::types::{AppState, CalibrationSettings, RawSample, Reading};

#[derive(Debug, Serialize)]
pub(crate) struct SettingsResponse {
    success: bool,
    settings: Arc<CalibrationSettings>,
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn dashboard(State(state): State<AppState>) -> Response {
    let path = state.cfg.public_dir.join(DASHBOARD_INDEX_FILE);
    match fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(error) => {
            warn!("Dashboard unavailable at {}: {error}", path.display());
            (
                StatusCode::NOT_FOUND,
                format!(
                    "Dashboard not found. Expected {} to exist on the server.",
                    path.display()
                ),
            )
                .into_response()
        }
    }
}

pub async fn ingest_data(
    State(state): State<AppState>,
    Json(sample): Json<RawSample>,
) -> &'static str {
    let reading = state.readings.ingest(&state.settings, sample).await;
    let mode = if reading.conversion.is_some() {
        "server"
    } else {
        "device"
    };
    match reading.depth_to_water() {
        Some(depth) => info!("Data updated ({mode} calc): depth {depth:.1} ft"),
        None => info!("Data updated ({mode} calc): no depth reported"),
    }
    "Data Processed"
}

pub async fn latest_data(State(state): State<AppState>) -> Json<Arc<Reading>> {
    Json(state.readings.read().await)
}

pub async fn get_settings(State(state): State<AppState>) -> Json<Arc<CalibrationSettings>> {
    Json(state.settings.read().await)
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<SettingsResponse>, AppError> {
    match state.settings.update(&body).await {
        Ok(settings) => {
            info!(
                "New settings: cable {} ft, well {} ft, offset {} V, divider {}",
                settings.cable_length,
                settings.well_depth,
                settings.sensor_offset,
                settings.divider_factor
            );
            Ok(Json(SettingsResponse {
                success: true,
                settings,
            }))
        }
        Err(error) => {
            warn!("Rejected settings update: {error}");
            Err(error)
        }
    }
}

pub async fn upload_firmware(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::BadRequest(format!("Malformed upload: {error}")))?
    {
        if field.name() != Some(FIRMWARE_FIELD_NAME) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|error| AppError::BadRequest(format!("Malformed upload: {error}")))?;
        state.firmware.store(&bytes).await?;
        info!("New firmware uploaded ({} bytes)", bytes.len());
        return Ok(Redirect::to("/"));
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field '{FIRMWARE_FIELD_NAME}'."
    )))
}

pub async fn fetch_firmware(State(state): State<AppState>) -> Result<Response, AppError> {
    let bytes = state.firmware.fetch().await.inspect_err(|error| {
        if matches!(error, AppError::NotFound) {
            info!("Firmware requested but none has been uploaded");
        }
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static(FIRMWARE_CONTENT_DISPOSITION),
    );
    Ok((headers, bytes).into_response())
}
