//! Application services

mod orchestrator;

pub use orchestrator::SimulationOrchestrator;
