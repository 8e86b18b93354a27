//! Backend infrastructure - algorithm service adapters

mod http;
mod registry;

pub use http::{HttpBackend, HttpBackendConfig, MODEL_FIELD};
pub use registry::BackendRegistry;
