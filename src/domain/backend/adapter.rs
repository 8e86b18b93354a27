//! Algorithm backend trait

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// A trained model file received from a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ModelArtifact {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Same artifact under another file name
    pub fn renamed(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Run request sent to an algorithm service; `id` is the result key the
/// service reports back under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchPayload {
    pub id: String,
    pub model: String,
    pub image: String,
}

/// An external compute service that can store models and start runs
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SimulationBackend: Send + Sync {
    /// Identifier clients use to address this backend
    fn id(&self) -> String;

    /// Hands a model file over to the service
    async fn upload_model(&self, artifact: ModelArtifact) -> Result<(), DomainError>;

    /// Starts a run of `op_type` and returns the service's HTTP status.
    /// Transport failures are errors; non-success statuses are not.
    async fn run_simulation(&self, op_type: &str, payload: Bytes) -> Result<u16, DomainError>;
}
