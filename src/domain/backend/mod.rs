//! Backend domain - contract of the external algorithm services

mod adapter;

pub use adapter::{DispatchPayload, ModelArtifact, SimulationBackend};

#[cfg(test)]
pub use adapter::MockSimulationBackend;
