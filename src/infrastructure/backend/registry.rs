//! Registry of the configured algorithm backends

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::{DomainError, SimulationBackend};

use super::http::{HttpBackend, HttpBackendConfig};

/// Backends addressable by identifier, in registration order
#[derive(Clone, Default)]
pub struct BackendRegistry {
    order: Vec<String>,
    backends: HashMap<String, Arc<dyn SimulationBackend>>,
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.order)
            .finish()
    }
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds HTTP backends for every configuration entry
    pub fn from_configs(configs: &[HttpBackendConfig]) -> Result<Self, DomainError> {
        let mut registry = Self::new();

        for config in configs {
            registry.register(Arc::new(HttpBackend::new(config.clone())?))?;
        }

        Ok(registry)
    }

    /// Adds a backend; identifiers must be unique
    pub fn register(&mut self, backend: Arc<dyn SimulationBackend>) -> Result<(), DomainError> {
        let id = backend.id();

        if id.is_empty() {
            return Err(DomainError::configuration("Backend identifier must not be empty"));
        }

        if self.backends.contains_key(&id) {
            return Err(DomainError::configuration(format!(
                "Backend '{}' is registered twice",
                id
            )));
        }

        self.order.push(id.clone());
        self.backends.insert(id, backend);
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_backend(mut self, backend: Arc<dyn SimulationBackend>) -> Result<Self, DomainError> {
        self.register(backend)?;
        Ok(self)
    }

    /// Resolves a backend by identifier
    pub fn resolve(&self, id: &str) -> Result<Arc<dyn SimulationBackend>, DomainError> {
        self.backends
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::backend_not_found(id))
    }

    /// Registered identifiers in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
