//! Simulation run and result handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, LenientJson, ResultUpdate, RunSimulationBody};
use crate::domain::SimulationRecord;

/// POST /v1/simulation-results/{type}
pub async fn run_simulation(
    State(state): State<AppState>,
    Path(op_type): Path<String>,
    LenientJson(body): LenientJson<RunSimulationBody>,
) -> Result<StatusCode, ApiError> {
    debug!(op_type = %op_type, backend_id = %body.id, "Running simulation");

    state
        .orchestrator
        .run_simulation(&op_type, body.into())
        .await?;

    Ok(StatusCode::ACCEPTED)
}

/// PUT /v1/simulation-results
pub async fn update_results(
    State(state): State<AppState>,
    Json(update): Json<ResultUpdate>,
) -> Result<StatusCode, ApiError> {
    state
        .orchestrator
        .update_results(&update.id, &update.content)
        .await?;

    Ok(StatusCode::OK)
}

/// GET /v1/simulation-results/{type}/{alg}
pub async fn list_results(
    State(state): State<AppState>,
    Path((op_type, backend_id)): Path<(String, String)>,
) -> Result<Json<Vec<SimulationRecord>>, ApiError> {
    let records = state.orchestrator.results(&op_type, &backend_id).await?;
    Ok(Json(records))
}
