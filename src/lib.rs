//! Simulation Gateway
//!
//! HTTP orchestrator between clients, a key-value store and a set of
//! algorithm services:
//! - Image and model catalogs kept as JSON aggregates in the store
//! - Simulation dispatch with an in-progress/finished/error lifecycle
//! - Result scans by operation type and backend

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::KeyValueStore;
use infrastructure::backend::BackendRegistry;
use infrastructure::services::SimulationOrchestrator;
use infrastructure::store::StoreFactory;
use tracing::info;

/// Create the application state: store client, backend registry and orchestrator
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let store_config = config.store.to_store_config()?;
    info!(store = %store_config.store_type, "Connecting to store");

    let store = StoreFactory::new().create(&store_config).await?;

    create_app_state_with_store(config, store)
}

/// Create the application state around an existing store
pub fn create_app_state_with_store(
    config: &AppConfig,
    store: Arc<dyn KeyValueStore>,
) -> anyhow::Result<AppState> {
    let backends = BackendRegistry::from_configs(&config.backend_configs())?;
    info!(
        backends = %backends.ids().collect::<Vec<_>>().join(","),
        "Registered algorithm backends"
    );

    let orchestrator = SimulationOrchestrator::new(store, backends);

    Ok(AppState::new(Arc::new(orchestrator)))
}
