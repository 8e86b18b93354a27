//! Simulation domain - images, model catalog and run lifecycle

mod clock;
mod entity;
mod key;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::{
    DEFAULT_MODEL, ERROR_SENTINEL, IMAGES_KEY, ImageSet, MODELS_KEY, ModelCatalog,
    SimulationRecord, SimulationRequest, SimulationStatus,
};
pub use key::{ResultKey, TIMESTAMP_GLOB, format_timestamp};
