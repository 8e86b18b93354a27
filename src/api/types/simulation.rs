//! Request bodies of the v1 API

use serde::{Deserialize, Serialize};

use crate::domain::SimulationRequest;

/// `PUT /v1/images`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpload {
    #[serde(default)]
    pub id: String,
    pub content: String,
}

/// `POST /v1/simulation-results/{type}`; `id` names the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSimulationBody {
    pub id: String,
    pub model: String,
    pub image: String,
}

impl From<RunSimulationBody> for SimulationRequest {
    fn from(body: RunSimulationBody) -> Self {
        Self {
            backend_id: body.id,
            model: body.model,
            image: body.image,
        }
    }
}

/// `PUT /v1/simulation-results`; `id` is the result key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultUpdate {
    pub id: String,
    pub content: String,
}
