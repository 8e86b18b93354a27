//! Simulation orchestrator - images, models and run lifecycle over the store

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::simulation::{IMAGES_KEY, MODELS_KEY, format_timestamp};
use crate::domain::{
    Clock, DispatchPayload, DomainError, ImageSet, KeyValueStore, KeyValueStoreExt, ModelArtifact,
    ModelCatalog, ResultKey, SimulationRecord, SimulationRequest, SystemClock,
};
use crate::infrastructure::backend::BackendRegistry;
use crate::infrastructure::observability::{
    DispatchOutcome, record_simulation_dispatch, record_simulation_result,
};

/// HTTP status an algorithm service must answer a dispatch with
const DISPATCH_ACCEPTED: u16 = 200;

const DISPATCH_FAILED: &str = "failed to run simulation";

/// Operation types become a path segment of the backend URL
fn validate_operation_type(op_type: &str) -> Result<(), DomainError> {
    if op_type.is_empty() {
        return Err(DomainError::validation("operation type must not be empty"));
    }

    let path_like = op_type == "."
        || op_type.contains("..")
        || op_type.contains(['/', '\\', '?', '#']);
    if path_like {
        return Err(DomainError::validation(format!(
            "invalid operation type '{}'",
            op_type
        )));
    }

    Ok(())
}

/// Stateless coordinator between clients, the store and the backends
///
/// All aggregates live in the store. Read-modify-write cycles on the
/// image set and the model catalog are serialized per aggregate within
/// this process; writers in other processes can still interleave.
#[derive(Debug)]
pub struct SimulationOrchestrator {
    store: Arc<dyn KeyValueStore>,
    backends: BackendRegistry,
    clock: Arc<dyn Clock>,
    images_lock: Mutex<()>,
    models_lock: Mutex<()>,
}

impl SimulationOrchestrator {
    pub fn new(store: Arc<dyn KeyValueStore>, backends: BackendRegistry) -> Self {
        Self {
            store,
            backends,
            clock: Arc::new(SystemClock),
            images_lock: Mutex::new(()),
            models_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn backends(&self) -> &BackendRegistry {
        &self.backends
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Seeds the model catalog and the image set.
    ///
    /// Existing aggregates are kept; backends missing from an existing
    /// catalog get a `["default"]` entry. Only store errors other than
    /// absence abort.
    pub async fn initialize(&self) -> Result<(), DomainError> {
        {
            let _guard = self.models_lock.lock().await;

            match self.store.find_json::<ModelCatalog>(MODELS_KEY).await? {
                None => {
                    let catalog = ModelCatalog::seeded(self.backends.ids());
                    self.store.set_json(MODELS_KEY, &catalog).await?;
                    info!(backends = self.backends.len(), "Seeded model catalog");
                }
                Some(mut catalog) => {
                    let mut changed = false;
                    for id in self.backends.ids() {
                        changed |= catalog.ensure_backend(id);
                    }

                    if changed {
                        self.store.set_json(MODELS_KEY, &catalog).await?;
                        info!("Registered new backends in existing model catalog");
                    } else {
                        debug!("Model catalog already initialized");
                    }
                }
            }
        }

        let _guard = self.images_lock.lock().await;

        match self.store.get(IMAGES_KEY).await {
            Ok(_) => debug!("Image set already initialized"),
            Err(e) if e.is_not_found() => {
                self.store.set_json(IMAGES_KEY, &ImageSet::default()).await?;
                info!("Seeded empty image set");
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    /// Appends an image to the image set
    pub async fn add_image(&self, content: String) -> Result<(), DomainError> {
        let _guard = self.images_lock.lock().await;

        let mut images: ImageSet = self.store.get_json(IMAGES_KEY).await?;
        images.push(content);
        self.store.set_json(IMAGES_KEY, &images).await?;

        debug!(count = images.len(), "Image added");
        Ok(())
    }

    pub async fn images(&self) -> Result<ImageSet, DomainError> {
        self.store.get_json(IMAGES_KEY).await
    }

    /// Uploads a model to a backend under `display_name` and records it
    /// in the catalog. Nothing is recorded when the upload fails.
    pub async fn upload_model(
        &self,
        backend_id: &str,
        display_name: &str,
        artifact: ModelArtifact,
    ) -> Result<(), DomainError> {
        let backend = self.backends.resolve(backend_id)?;

        backend
            .upload_model(artifact.renamed(display_name))
            .await
            .inspect_err(|e| warn!(backend_id = %backend_id, error = %e, "Model upload failed"))?;

        let _guard = self.models_lock.lock().await;

        let mut catalog: ModelCatalog = self.store.get_json(MODELS_KEY).await?;
        catalog.append(backend_id, display_name);
        self.store.set_json(MODELS_KEY, &catalog).await?;

        info!(backend_id = %backend_id, model = %display_name, "Model uploaded");
        Ok(())
    }

    /// Models recorded for a backend; unknown backends have none
    pub async fn models(&self, backend_id: &str) -> Result<Vec<String>, DomainError> {
        let catalog: ModelCatalog = self.store.get_json(MODELS_KEY).await?;
        Ok(catalog.models_for(backend_id).to_vec())
    }

    /// Dispatches a run and records it as `in-progress`.
    ///
    /// The record is only written once the backend accepted the run.
    pub async fn run_simulation(
        &self,
        op_type: &str,
        request: SimulationRequest,
    ) -> Result<ResultKey, DomainError> {
        validate_operation_type(op_type)?;

        let created_at = self.clock.now();
        let key = ResultKey::new(&created_at, &request.backend_id, op_type);

        let backend = self.backends.resolve(&request.backend_id)?;

        let payload = serde_json::to_vec(&DispatchPayload {
            id: key.to_string(),
            model: request.model.clone(),
            image: request.image.clone(),
        })
        .map_err(|e| DomainError::serialization(format!("failed to marshal payload: {}", e)))?;

        let status = match backend.run_simulation(op_type, payload.into()).await {
            Ok(status) => status,
            Err(e) => {
                record_simulation_dispatch(&request.backend_id, op_type, DispatchOutcome::Failed);
                warn!(backend_id = %request.backend_id, op_type = %op_type, error = %e, "Dispatch failed");
                return Err(DomainError::dispatch(request.backend_id, DISPATCH_FAILED));
            }
        };

        if status != DISPATCH_ACCEPTED {
            record_simulation_dispatch(&request.backend_id, op_type, DispatchOutcome::Rejected);
            warn!(backend_id = %request.backend_id, op_type = %op_type, status, "Dispatch rejected");
            return Err(DomainError::dispatch(request.backend_id, DISPATCH_FAILED));
        }

        record_simulation_dispatch(&request.backend_id, op_type, DispatchOutcome::Accepted);

        let record = SimulationRecord::in_progress(
            request.backend_id,
            request.model,
            request.image,
            format_timestamp(&created_at),
        );
        self.store.set_json(key.as_str(), &record).await?;

        info!(record_key = %key, op_type = %op_type, "Simulation dispatched");
        Ok(key)
    }

    /// Applies a reported result to an existing record
    pub async fn update_results(
        &self,
        record_key: &str,
        content: &str,
    ) -> Result<SimulationRecord, DomainError> {
        let mut record: SimulationRecord = self.store.get_json(record_key).await?;

        if record.status.is_terminal() {
            debug!(record_key = %record_key, status = %record.status, "Overwriting terminal record");
        }

        record.apply_result(content);
        self.store.set_json(record_key, &record).await?;

        record_simulation_result(record.status.as_str());
        info!(record_key = %record_key, status = %record.status, "Simulation result stored");
        Ok(record)
    }

    /// Records of every run of `op_type` on `backend_id`, oldest first
    pub async fn results(
        &self,
        op_type: &str,
        backend_id: &str,
    ) -> Result<Vec<SimulationRecord>, DomainError> {
        let pattern = ResultKey::search_pattern(backend_id, op_type);
        let mut keys = self.store.keys(&pattern).await?;
        keys.sort();

        let mut records = Vec::with_capacity(keys.len());

        for key in keys {
            let record: SimulationRecord = self.store.get_json(&key).await?;

            // Concatenated keys can collide across (backend, op) pairs
            if record.algorithm != backend_id {
                debug!(record_key = %key, "Skipping record of another backend");
                continue;
            }

            records.push(record);
        }

        Ok(records)
    }
}
