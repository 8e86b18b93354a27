//! HTTP algorithm backend

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::domain::{DomainError, ModelArtifact, SimulationBackend};

/// Multipart field the algorithm services read the model file from
pub const MODEL_FIELD: &str = "model";

/// Connection settings of one algorithm service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBackendConfig {
    pub id: String,
    pub url: String,
    pub timeout: Duration,
}

impl HttpBackendConfig {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Algorithm service reached over HTTP
///
/// - `POST {url}/upload_model` with a multipart `model` file
/// - `POST {url}/{op_type}` with the JSON run payload
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: HttpBackendConfig,
    client: Client,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!(
                    "Failed to build HTTP client for '{}': {}",
                    config.id, e
                ))
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl SimulationBackend for HttpBackend {
    fn id(&self) -> String {
        self.config.id.clone()
    }

    async fn upload_model(&self, artifact: ModelArtifact) -> Result<(), DomainError> {
        let url = self.endpoint("upload_model");
        debug!(backend_id = %self.config.id, file_name = %artifact.file_name, size = artifact.len(), "Uploading model");

        let mut part = Part::bytes(artifact.bytes.to_vec()).file_name(artifact.file_name.clone());

        if let Some(content_type) = &artifact.content_type {
            part = part.mime_str(content_type).map_err(|e| {
                DomainError::validation(format!("Invalid content type '{}': {}", content_type, e))
            })?;
        }

        let response = self
            .client
            .post(&url)
            .multipart(Form::new().part(MODEL_FIELD, part))
            .send()
            .await
            .map_err(|e| DomainError::dispatch(&self.config.id, format!("Upload request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(backend_id = %self.config.id, status = %status, "Model upload rejected");

            return Err(DomainError::dispatch(
                &self.config.id,
                format!("Model upload failed with HTTP {}: {}", status, body),
            ));
        }

        Ok(())
    }

    async fn run_simulation(&self, op_type: &str, payload: Bytes) -> Result<u16, DomainError> {
        let url = self.endpoint(op_type);
        debug!(backend_id = %self.config.id, op_type = %op_type, "Dispatching simulation");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| DomainError::dispatch(&self.config.id, format!("Dispatch request failed: {}", e)))?;

        Ok(response.status().as_u16())
    }
}
