//! End-to-end tests for the rendering API
//!
//! Drives the full router with a counting fake engine: request in, PDF
//! bytes (or JSON error) out.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use pdfsmith::config::Config;
use pdfsmith::engine::fake::{CountingEngine, Recorder};
use pdfsmith::engine::{EngineFactory, RenderEngine};
use pdfsmith::error::Result;
use pdfsmith::routes;
use pdfsmith::state::AppState;
use pdfsmith::storage::{DiskRegistry, LocalDisk};
use pdfsmith::view::TeraViews;

/// Hands out counting engines and keeps a recorder for each one
#[derive(Default)]
struct RecordingFactory {
    warnings: Vec<String>,
    recorders: Arc<Mutex<Vec<Recorder>>>,
}

impl RecordingFactory {
    fn with_warnings(warnings: &[&str]) -> Self {
        Self {
            warnings: warnings.iter().map(|s| s.to_string()).collect(),
            recorders: Arc::default(),
        }
    }

    fn last_recorder(&self) -> Option<Recorder> {
        self.recorders.lock().unwrap().last().cloned()
    }
}

impl EngineFactory for RecordingFactory {
    fn create(&self) -> Result<Box<dyn RenderEngine>> {
        let engine = CountingEngine::new().with_warnings(self.warnings.clone());
        self.recorders.lock().unwrap().push(engine.recorder());
        Ok(Box::new(engine))
    }
}

struct TestServer {
    app: Router,
    factory: Arc<RecordingFactory>,
    storage: tempfile::TempDir,
    _templates: tempfile::TempDir,
}

fn server() -> TestServer {
    server_with(RecordingFactory::default())
}

fn server_with(factory: RecordingFactory) -> TestServer {
    let storage = tempfile::tempdir().unwrap();
    let templates = tempfile::tempdir().unwrap();
    std::fs::write(
        templates.path().join("invoice.html"),
        "<p>{{ customer }} owes {{ total }}</p>",
    )
    .unwrap();

    let views = TeraViews::new(templates.path()).unwrap();
    let mut disks = DiskRegistry::new("local");
    disks.register("local", Arc::new(LocalDisk::new(storage.path())));

    let factory = Arc::new(factory);
    let state = AppState::new(Config::default(), factory.clone(), Arc::new(views), disks);
    let app = Router::new()
        .nest("/api/v1/render", routes::render::router())
        .with_state(state);

    TestServer {
        app,
        factory,
        storage,
        _templates: templates,
    }
}

async fn post_json(app: Router, uri: &str, body: Value) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

#[tokio::test]
async fn test_render_returns_attachment_pdf() {
    let server = server();

    let response = post_json(
        server.app.clone(),
        "/api/v1/render",
        json!({"html": "<p>hello</p>", "filename": "out%1.pdf"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"out1.pdf\""));

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(server.factory.last_recorder().unwrap().render_count(), 1);
}

#[tokio::test]
async fn test_inline_disposition() {
    let server = server();

    let response = post_json(
        server.app.clone(),
        "/api/v1/render",
        json!({"html": "<p>hello</p>", "disposition": "inline"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("inline"));
}

#[tokio::test]
async fn test_view_rendering_with_merge_override() {
    let server = server();

    let response = post_json(
        server.app.clone(),
        "/api/v1/render/view",
        json!({
            "template": "invoice.html",
            "data": {"customer": "acme", "total": 10},
            "merge_data": {"total": 99}
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let recorder = server.factory.last_recorder().unwrap();
    assert_eq!(recorder.last_markup().unwrap(), "<p>acme owes 99</p>");
}

#[tokio::test]
async fn test_view_route_requires_a_template() {
    let server = server();

    let response = post_json(
        server.app.clone(),
        "/api/v1/render/view",
        json!({"html": "<p>not a view</p>"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_source_is_a_bad_request() {
    let server = server();

    let response = post_json(server.app.clone(), "/api/v1/render", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "InvalidRequest");
}

#[tokio::test]
async fn test_save_persists_to_the_local_disk() {
    let server = server();

    let response = post_json(
        server.app.clone(),
        "/api/v1/render/save",
        json!({"html": "<p>hello</p>", "path": "out/report.pdf"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["disk"], "local");
    assert_eq!(body["path"], "out/report.pdf");
    assert!(body["size"].as_u64().unwrap() > 0);

    assert!(server.storage.path().join("out/report.pdf").exists());
}

#[tokio::test]
async fn test_save_with_unknown_disk_fails() {
    let server = server();

    let response = post_json(
        server.app.clone(),
        "/api/v1/render/save",
        json!({"html": "<p>hello</p>", "path": "x.pdf", "disk": "missing"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_strict_warnings_escalate_to_an_error() {
    let server = server_with(RecordingFactory::with_warnings(&[
        "table overflow",
        "missing font",
    ]));

    let response = post_json(
        server.app.clone(),
        "/api/v1/render",
        json!({"html": "<p>hello</p>", "strict_warnings": true}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "RenderedWithWarnings");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("table overflow\nmissing font"));
}

#[tokio::test]
async fn test_lax_warnings_still_render() {
    let server = server_with(RecordingFactory::with_warnings(&["table overflow"]));

    let response = post_json(
        server.app.clone(),
        "/api/v1/render",
        json!({"html": "<p>hello</p>"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_arabic_markup_is_reshaped_before_the_engine() {
    let server = server();

    let response = post_json(
        server.app.clone(),
        "/api/v1/render",
        json!({"html": "<p>محمد</p>"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let recorder = server.factory.last_recorder().unwrap();
    assert_eq!(
        recorder.last_markup().unwrap(),
        "<p>\u{FEAA}\u{FEE4}\u{FEA4}\u{FEE3}</p>"
    );
}
