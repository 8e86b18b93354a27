//! Domain layer - Core entities, contracts and errors

pub mod backend;
pub mod error;
pub mod simulation;
pub mod store;

pub use backend::{DispatchPayload, ModelArtifact, SimulationBackend};
pub use error::{DomainError, KEY_NOT_FOUND};
pub use simulation::{
    Clock, FixedClock, ImageSet, ModelCatalog, ResultKey, SimulationRecord, SimulationRequest,
    SimulationStatus, SystemClock,
};
pub use store::{GlobPattern, KeyValueStore, KeyValueStoreExt};
