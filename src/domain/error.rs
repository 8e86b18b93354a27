use thiserror::Error;

/// Message reported by every store client when a key is absent
pub const KEY_NOT_FOUND: &str = "key does not exist";

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("algorithm with id '{backend_id}' does not exist")]
    BackendNotFound { backend_id: String },

    #[error("{backend_id}: {message}")]
    Dispatch { backend_id: String, message: String },

    #[error("{message}")]
    Storage { message: String },

    #[error("{message}")]
    Serialization { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DomainError {
    /// The distinguished "absent key" error of the store contract
    pub fn key_not_found() -> Self {
        Self::NotFound {
            message: KEY_NOT_FOUND.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn backend_not_found(backend_id: impl Into<String>) -> Self {
        Self::BackendNotFound {
            backend_id: backend_id.into(),
        }
    }

    pub fn dispatch(backend_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dispatch {
            backend_id: backend_id.into(),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True when the store reported the key as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
