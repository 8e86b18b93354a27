//! API types - request bodies, extractors and the error envelope

pub mod error;
pub mod json;
pub mod simulation;

pub use error::{ApiError, ApiErrorResponse, ROUTE_NOT_FOUND};
pub use json::{INVALID_CONTENT_TYPE, Json, LenientJson};
pub use simulation::{ImageUpload, ResultUpdate, RunSimulationBody};
