//! Aggregates persisted by the gateway

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Store key of the image aggregate
pub const IMAGES_KEY: &str = "images";

/// Store key of the model catalog aggregate
pub const MODELS_KEY: &str = "models";

/// Model name every backend is seeded with
pub const DEFAULT_MODEL: &str = "default";

/// Content value an algorithm service posts back when a run failed
/// (the JSON encoding of the string `error`)
pub const ERROR_SENTINEL: &str = "\"error\"";

/// Ordered, append-only list of opaque image contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

impl ImageSet {
    pub fn push(&mut self, content: impl Into<String>) {
        self.images.push(content.into());
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Model names uploaded per backend identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(default, deserialize_with = "null_as_default")]
    pub models: BTreeMap<String, Vec<String>>,
}

impl ModelCatalog {
    /// Catalog with a `["default"]` entry for each backend
    pub fn seeded<'a>(backend_ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut catalog = Self::default();
        for id in backend_ids {
            catalog.ensure_backend(id);
        }
        catalog
    }

    /// Adds a `["default"]` entry when the backend has none.
    /// Returns true if the catalog changed.
    pub fn ensure_backend(&mut self, backend_id: &str) -> bool {
        if self.models.contains_key(backend_id) {
            return false;
        }
        self.models
            .insert(backend_id.to_string(), vec![DEFAULT_MODEL.to_string()]);
        true
    }

    pub fn append(&mut self, backend_id: &str, name: impl Into<String>) {
        self.models
            .entry(backend_id.to_string())
            .or_default()
            .push(name.into());
    }

    /// Models of a backend; unknown backends have none
    pub fn models_for(&self, backend_id: &str) -> &[String] {
        self.models
            .get(backend_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Lifecycle of a dispatched simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimulationStatus {
    InProgress,
    Finished,
    Error,
}

impl SimulationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Finished => "finished",
            Self::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl std::fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dispatched computation, stored under its [`ResultKey`](super::ResultKey)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRecord {
    pub algorithm: String,
    pub model: String,
    pub image: String,
    #[serde(default)]
    pub result: String,
    pub time_stamp: String,
    pub status: SimulationStatus,
}

impl SimulationRecord {
    pub fn in_progress(
        algorithm: impl Into<String>,
        model: impl Into<String>,
        image: impl Into<String>,
        time_stamp: impl Into<String>,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            model: model.into(),
            image: image.into(),
            result: String::new(),
            time_stamp: time_stamp.into(),
            status: SimulationStatus::InProgress,
        }
    }

    /// Applies the result an algorithm service reported.
    ///
    /// The error sentinel moves the record to `error` with an empty
    /// result; anything else moves it to `finished` with `content` as the
    /// result. Applying an update to a terminal record overwrites it.
    pub fn apply_result(&mut self, content: &str) {
        if content == ERROR_SENTINEL {
            self.status = SimulationStatus::Error;
            self.result.clear();
        } else {
            self.status = SimulationStatus::Finished;
            self.result = content.to_string();
        }
    }
}

/// A client's request to run an operation on a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationRequest {
    pub backend_id: String,
    pub model: String,
    pub image: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
