use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use tracing::{error, info, instrument, warn};

use super::dto::{ScanBase64Request, ScanResponse};
use crate::images::normalize_image;
use crate::state::AppState;

pub fn scan_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/scan", post(scan_multipart)) // multipart field `file`
        .route("/scan/base64", post(scan_base64))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

async fn scan_bytes(state: &AppState, body: Bytes) -> Result<ScanResponse, (StatusCode, String)> {
    let cfg = state.config.image;
    let image = tokio::task::spawn_blocking(move || normalize_image(&body, &cfg))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            warn!(error = %e, "uploaded file is not a usable image");
            e
        })?;

    let estimate = state.recognizer.recognize(&image.base64).await.map_err(|e| {
        error!(error = %e, "recognition failed");
        e
    })?;

    info!(name = ?estimate.name, calories = ?estimate.calories, "scan complete");
    Ok(ScanResponse {
        estimate,
        image_url: image.data_url(),
        width: image.width,
        height: image.height,
    })
}

/// POST /scan (multipart), first `file`/`image` field is used
#[instrument(skip(state, mp))]
pub async fn scan_multipart(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<ScanResponse>, (StatusCode, String)> {
    let mut upload = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if matches!(field.name(), Some("file") | Some("image")) {
            let data = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            upload = Some(data);
            break;
        }
    }
    let Some(body) = upload.filter(|b| !b.is_empty()) else {
        return Err((StatusCode::BAD_REQUEST, "file is required".into()));
    };

    scan_bytes(&state, body).await.map(Json)
}

/// POST /scan/base64 { image_b64: "..." }, a `data:` URL prefix is tolerated
#[instrument(skip(state, body))]
pub async fn scan_base64(
    State(state): State<AppState>,
    Json(body): Json<ScanBase64Request>,
) -> Result<Json<ScanResponse>, (StatusCode, String)> {
    let payload = match body.image_b64.split_once(',') {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => body.image_b64.as_str(),
    };
    if payload.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "image_b64 is required".into()));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| (StatusCode::BAD_REQUEST, "invalid base64".into()))?;

    scan_bytes(&state, Bytes::from(bytes)).await.map(Json)
}
