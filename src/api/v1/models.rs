//! Model endpoint handlers

use axum::{
    extract::{
        Multipart, Path, State,
        multipart::{Field, MultipartRejection},
    },
    http::StatusCode,
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::ModelArtifact;
use crate::infrastructure::backend::MODEL_FIELD;

/// Multipart form of a model upload
#[derive(Debug, Default)]
struct ModelUploadForm {
    backend_id: Option<String>,
    name: Option<String>,
    artifact: Option<ModelArtifact>,
}

/// PUT /v1/models
///
/// Multipart fields: `id` (backend), `name` (display name) and the
/// `model` file.
pub async fn upload_model(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, ApiError> {
    let multipart = multipart.map_err(|e| {
        ApiError::bad_request(format!("failed to parse multipart form: {}", e.body_text()))
    })?;

    let form = read_form(multipart).await?;

    let backend_id = form
        .backend_id
        .ok_or_else(|| ApiError::bad_request("missing form field 'id'").with_param("id"))?;
    let name = form
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing form field 'name'").with_param("name"))?;
    let artifact = form.artifact.ok_or_else(|| {
        ApiError::bad_request("missing model file").with_param(MODEL_FIELD)
    })?;

    debug!(backend_id = %backend_id, model = %name, size = artifact.len(), "Uploading model");

    state
        .orchestrator
        .upload_model(&backend_id, &name, artifact)
        .await?;

    Ok(StatusCode::OK)
}

async fn read_form(mut multipart: Multipart) -> Result<ModelUploadForm, ApiError> {
    let mut form = ModelUploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "id" => form.backend_id = Some(read_text(field).await?),
            "name" => form.name = Some(read_text(field).await?),
            MODEL_FIELD => {
                let file_name = field.file_name().unwrap_or(MODEL_FIELD).to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("failed to read model file: {}", e))
                })?;

                let mut artifact = ModelArtifact::new(file_name, bytes);
                if let Some(content_type) = content_type {
                    artifact = artifact.with_content_type(content_type);
                }
                form.artifact = Some(artifact);
            }
            other => debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    Ok(form)
}

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("failed to read multipart field: {}", e)))
}

/// GET /v1/models/{alg}
pub async fn list_models(
    State(state): State<AppState>,
    Path(backend_id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let models = state.orchestrator.models(&backend_id).await?;
    Ok(Json(models))
}
