//! Image endpoint handlers

use axum::{extract::State, http::StatusCode};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ImageUpload, Json};
use crate::domain::ImageSet;

/// PUT /v1/images
pub async fn add_image(
    State(state): State<AppState>,
    Json(upload): Json<ImageUpload>,
) -> Result<StatusCode, ApiError> {
    debug!(size = upload.content.len(), "Adding image");

    state.orchestrator.add_image(upload.content).await?;

    Ok(StatusCode::OK)
}

/// GET /v1/images
pub async fn list_images(State(state): State<AppState>) -> Result<Json<ImageSet>, ApiError> {
    let images = state.orchestrator.images().await?;
    Ok(Json(images))
}
