//! Router-level tests for the v1 API against an in-memory store

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header::CONTENT_TYPE};
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use simulation_gateway::api::v1::DEFAULT_MAX_BODY_BYTES;
use simulation_gateway::api::{AppState, create_router_with_body_limit};
use simulation_gateway::domain::{
    DomainError, FixedClock, KeyValueStore, ModelArtifact, SimulationBackend,
};
use simulation_gateway::infrastructure::backend::BackendRegistry;
use simulation_gateway::infrastructure::services::SimulationOrchestrator;
use simulation_gateway::infrastructure::store::InMemoryStore;

const BOUNDARY: &str = "gateway-test-boundary";

/// Algorithm service double recording what it receives
#[derive(Debug)]
struct FakeBackend {
    id: String,
    run_status: u16,
    reject_uploads: bool,
    uploads: Mutex<Vec<ModelArtifact>>,
    runs: Mutex<Vec<(String, Value)>>,
}

impl FakeBackend {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            run_status: 200,
            reject_uploads: false,
            uploads: Mutex::new(Vec::new()),
            runs: Mutex::new(Vec::new()),
        }
    }

    fn answering(mut self, status: u16) -> Self {
        self.run_status = status;
        self
    }

    fn rejecting_uploads(mut self) -> Self {
        self.reject_uploads = true;
        self
    }
}

#[async_trait]
impl SimulationBackend for FakeBackend {
    fn id(&self) -> String {
        self.id.clone()
    }

    async fn upload_model(&self, artifact: ModelArtifact) -> Result<(), DomainError> {
        if self.reject_uploads {
            return Err(DomainError::dispatch(&self.id, "upload refused"));
        }
        self.uploads.lock().unwrap().push(artifact);
        Ok(())
    }

    async fn run_simulation(&self, op_type: &str, payload: Bytes) -> Result<u16, DomainError> {
        let payload: Value = serde_json::from_slice(&payload).unwrap();
        self.runs
            .lock()
            .unwrap()
            .push((op_type.to_string(), payload));
        Ok(self.run_status)
    }
}

struct Gateway {
    app: Router,
    store: Arc<InMemoryStore>,
    backend: Arc<FakeBackend>,
    clock: Arc<FixedClock>,
}

impl Gateway {
    async fn start(store: InMemoryStore, backend: FakeBackend) -> Self {
        Self::start_with_body_limit(store, backend, DEFAULT_MAX_BODY_BYTES).await
    }

    async fn start_with_body_limit(
        store: InMemoryStore,
        backend: FakeBackend,
        max_body_bytes: usize,
    ) -> Self {
        let store = Arc::new(store);
        let backend = Arc::new(backend);
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2009, 11, 10, 20, 34, 58).unwrap(),
        ));

        let registry = BackendRegistry::new()
            .with_backend(backend.clone())
            .unwrap();
        let orchestrator =
            SimulationOrchestrator::new(store.clone(), registry).with_clock(clock.clone());
        orchestrator.initialize().await.unwrap();

        let app = create_router_with_body_limit(
            AppState::new(Arc::new(orchestrator)),
            max_body_bytes,
        );

        Self {
            app,
            store,
            backend,
            clock,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Bytes) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn send_json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Bytes) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn stored(&self, key: &str) -> Option<Value> {
        self.store
            .get(key)
            .await
            .ok()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }
}

fn error_message(body: &Bytes) -> String {
    let value: Value = serde_json::from_slice(body).unwrap();
    value["error"]["message"].as_str().unwrap().to_string()
}

fn model_form(id: &str, name: &str, file: Option<&[u8]>) -> Request<Body> {
    let mut body = Vec::new();

    for (field, value) in [("id", id), ("name", name)] {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"model\"; filename=\"weights.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::put("/v1/models")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// A base64 data URL of roughly `bytes` characters
fn camera_frame(bytes: usize) -> String {
    format!("data:image/jpeg;base64,{}", "A".repeat(bytes))
}

fn run_request(op_type: &str, backend_id: &str) -> Request<Body> {
    // Browser clients post this body as text
    Request::post(format!("/v1/simulation-results/{op_type}"))
        .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
        .body(Body::from(
            json!({"id": backend_id, "model": "m.h5", "image": "img"}).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_initialization_seeds_and_preserves() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("alg1")).await;

    let (status, body) = gateway.get("/v1/models/alg1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"["default"]"#);

    let (status, body) = gateway.get("/v1/images").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"images":[]}"#);

    let existing = InMemoryStore::with_entries([
        ("models", r#"{"models":{"alg1":["default","model.h5"]}}"#),
        ("images", r#"{"images":["a"]}"#),
    ]);
    let gateway = Gateway::start(existing, FakeBackend::new("alg1")).await;

    let (_, body) = gateway.get("/v1/models/alg1").await;
    assert_eq!(body, r#"["default","model.h5"]"#);
    let (_, body) = gateway.get("/v1/images").await;
    assert_eq!(body, r#"{"images":["a"]}"#);
}

#[tokio::test]
async fn test_images_are_appended_in_order() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("alg1")).await;

    for content in ["a", "b"] {
        let (status, _) = gateway
            .send_json(Method::PUT, "/v1/images", json!({"id": "x", "content": content}))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = gateway.get("/v1/images").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"images":["a","b"]}"#);
}

#[tokio::test]
async fn test_camera_frames_above_two_mib_are_accepted() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("algID")).await;
    let frame = camera_frame(3 * 1024 * 1024);

    let (status, _) = gateway
        .send_json(Method::PUT, "/v1/images", json!({"id": "x", "content": frame}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = gateway.get("/v1/images").await;
    let listed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(listed["images"][0].as_str().unwrap().len(), frame.len());

    let (status, _) = gateway
        .send(
            Request::post("/v1/simulation-results/demo")
                .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
                .body(Body::from(
                    json!({"id": "algID", "model": "m.h5", "image": frame}).to_string(),
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let record = gateway
        .stored("2009-11-10T20:34:58ZalgIDdemo")
        .await
        .unwrap();
    assert_eq!(record["image"].as_str().unwrap().len(), frame.len());
}

#[tokio::test]
async fn test_bodies_above_configured_limit_are_rejected() {
    let gateway = Gateway::start_with_body_limit(
        InMemoryStore::new(),
        FakeBackend::new("algID"),
        64 * 1024,
    )
    .await;
    let frame = camera_frame(128 * 1024);

    let (status, body) = gateway
        .send_json(Method::PUT, "/v1/images", json!({"id": "x", "content": frame}))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(error_message(&body).starts_with("failed to read body"));

    let (status, _) = gateway
        .send(
            Request::post("/v1/simulation-results/demo")
                .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
                .body(Body::from(
                    json!({"id": "algID", "model": "m.h5", "image": frame}).to_string(),
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(gateway.backend.runs.lock().unwrap().is_empty());

    let (_, body) = gateway.get("/v1/images").await;
    assert_eq!(body, r#"{"images":[]}"#);
}

#[tokio::test]
async fn test_add_image_requires_json() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("alg1")).await;

    let (status, body) = gateway
        .send(
            Request::put("/v1/images")
                .header(CONTENT_TYPE, "text/plain")
                .body(Body::from(r#"{"content":"a"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "invalid content type");

    let (status, body) = gateway
        .send(
            Request::put("/v1/images")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("failed to unmarshal body"));

    let (_, body) = gateway.get("/v1/images").await;
    assert_eq!(body, r#"{"images":[]}"#);
}

#[tokio::test]
async fn test_model_upload_appends_display_name() {
    let store = InMemoryStore::with_entries([
        ("models", r#"{"models":{"algID":["model.h5","model.h5"]}}"#),
        ("images", r#"{"images":[]}"#),
    ]);
    let gateway = Gateway::start(store, FakeBackend::new("algID")).await;

    let (status, _) = gateway
        .send(model_form("algID", "model.h5", Some(b"weights")))
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        gateway.stored("models").await.unwrap(),
        json!({"models": {"algID": ["model.h5", "model.h5", "model.h5"]}})
    );

    let uploads = gateway.backend.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].file_name, "model.h5");
    assert_eq!(uploads[0].bytes, Bytes::from_static(b"weights"));
}

#[tokio::test]
async fn test_model_upload_failures() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("alg1")).await;

    let (status, body) = gateway
        .send(model_form("alg9", "model.h5", Some(b"weights")))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(&body), "algorithm with id 'alg9' does not exist");

    let (status, _) = gateway.send(model_form("alg1", "model.h5", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = gateway
        .send_json(Method::PUT, "/v1/models", json!({"id": "alg1"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = gateway.get("/v1/models/alg1").await;
    assert_eq!(body, r#"["default"]"#);
}

#[tokio::test]
async fn test_rejected_upload_leaves_catalog_untouched() {
    let gateway = Gateway::start(
        InMemoryStore::new(),
        FakeBackend::new("alg1").rejecting_uploads(),
    )
    .await;

    let (status, _) = gateway
        .send(model_form("alg1", "model.h5", Some(b"weights")))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, body) = gateway.get("/v1/models/alg1").await;
    assert_eq!(body, r#"["default"]"#);
}

#[tokio::test]
async fn test_unknown_backend_models_are_empty() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("alg1")).await;

    let (status, body) = gateway.get("/v1/models/alg9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_run_simulation_lifecycle() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("algID")).await;

    let (status, _) = gateway.send(run_request("demo", "algID")).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let key = "2009-11-10T20:34:58ZalgIDdemo";
    {
        let runs = gateway.backend.runs.lock().unwrap();
        assert_eq!(
            runs.as_slice(),
            [(
                "demo".to_string(),
                json!({"id": key, "model": "m.h5", "image": "img"})
            )]
        );
    }

    let (status, body) = gateway.get("/v1/simulation-results/demo/algID").await;
    assert_eq!(status, StatusCode::OK);
    let records: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        records,
        json!([{
            "algorithm": "algID",
            "model": "m.h5",
            "image": "img",
            "result": "",
            "timeStamp": "2009-11-10T20:34:58Z",
            "status": "in-progress"
        }])
    );

    let (status, _) = gateway
        .send_json(
            Method::PUT,
            "/v1/simulation-results",
            json!({"id": key, "content": "{\"names\":[\"person\"]}"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let record = gateway.stored(key).await.unwrap();
    assert_eq!(record["status"], "finished");
    assert_eq!(record["result"], "{\"names\":[\"person\"]}");
}

#[tokio::test]
async fn test_error_sentinel_marks_record_failed() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("algID")).await;

    let (status, _) = gateway.send(run_request("demo", "algID")).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let key = "2009-11-10T20:34:58ZalgIDdemo";
    let (status, _) = gateway
        .send_json(
            Method::PUT,
            "/v1/simulation-results",
            json!({"id": key, "content": "\"error\""}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let record = gateway.stored(key).await.unwrap();
    assert_eq!(record["status"], "error");
    assert_eq!(record["result"], "");
}

#[tokio::test]
async fn test_failed_dispatch_persists_nothing() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("algID").answering(503)).await;

    let (status, body) = gateway.send(run_request("demo", "algID")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_message(&body).contains("failed to run simulation"));

    let (status, body) = gateway.send(run_request("demo", "alg9")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(&body), "algorithm with id 'alg9' does not exist");

    let mut keys = gateway.store.keys("*").await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["images", "models"]);
}

#[tokio::test]
async fn test_run_simulation_rejects_malformed_body() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("algID")).await;

    let (status, body) = gateway
        .send(
            Request::post("/v1/simulation-results/demo")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("failed to unmarshal body"));
    assert!(gateway.backend.runs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_run_simulation_rejects_path_like_operation() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("algID")).await;

    for op_type in ["..%2Fadmin", "demo%3Fdebug%3D1", "a%5Cb"] {
        let (status, body) = gateway.send(run_request(op_type, "algID")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{op_type}");
        assert!(error_message(&body).starts_with("invalid operation type"));
    }

    assert!(gateway.backend.runs.lock().unwrap().is_empty());
    let mut keys = gateway.store.keys("*").await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["images", "models"]);
}

#[tokio::test]
async fn test_results_are_listed_oldest_first() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("algID")).await;

    let (status, _) = gateway.send(run_request("demo", "algID")).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    gateway.clock.advance(chrono::Duration::seconds(90));

    let (status, _) = gateway.send(run_request("demo", "algID")).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (_, body) = gateway.get("/v1/simulation-results/demo/algID").await;
    let records: Vec<Value> = serde_json::from_slice(&body).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["timeStamp"], "2009-11-10T20:34:58Z");
    assert_eq!(records[1]["timeStamp"], "2009-11-10T20:36:28Z");

    let (_, body) = gateway.get("/v1/simulation-results/other/algID").await;
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_update_of_unknown_record_fails() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("algID")).await;

    let (status, body) = gateway
        .send_json(
            Method::PUT,
            "/v1/simulation-results",
            json!({"id": "2009-11-10T20:34:58ZalgIDdemo", "content": "x"}),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(&body), "key does not exist");
}

#[tokio::test]
async fn test_unknown_routes_and_methods_answer_404() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("alg1")).await;

    let (status, body) = gateway.get("/v1/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "404 not found");

    let (status, body) = gateway
        .send(Request::delete("/v1/images").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "404 not found");

    let (status, _) = gateway.get("/v1/simulation-results/demo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = gateway.get("/images").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_endpoints() {
    let gateway = Gateway::start(InMemoryStore::new(), FakeBackend::new("alg1")).await;

    let (status, _) = gateway.get("/health").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = gateway.get("/live").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = gateway.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    let ready: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(ready["status"], "healthy");
}
