//! Application state shared by the handlers

use std::sync::Arc;

use crate::infrastructure::services::SimulationOrchestrator;

#[derive(Clone, Debug)]
pub struct AppState {
    pub orchestrator: Arc<SimulationOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<SimulationOrchestrator>) -> Self {
        Self { orchestrator }
    }
}
