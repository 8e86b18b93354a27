//! v1 API endpoints

pub mod images;
pub mod models;
pub mod simulations;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use super::state::AppState;

/// Default upper bound of JSON bodies carrying inline images
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Upper bound of a model upload body
pub const MAX_MODEL_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// `max_body_bytes` applies to the routes whose bodies embed images
pub fn create_v1_router(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/images",
            get(images::list_images)
                .put(images::add_image)
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .route(
            "/models",
            put(models::upload_model).layer(DefaultBodyLimit::max(MAX_MODEL_UPLOAD_BYTES)),
        )
        .route("/models/{alg}", get(models::list_models))
        .route(
            "/simulation-results",
            put(simulations::update_results).layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .route(
            "/simulation-results/{op_type}",
            post(simulations::run_simulation).layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .route(
            "/simulation-results/{op_type}/{alg}",
            get(simulations::list_results),
        )
}
