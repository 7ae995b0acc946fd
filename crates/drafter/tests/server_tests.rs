use async_trait::async_trait;
use axum::{
  body::{to_bytes, Body},
  http::{header, Request, StatusCode},
  Router,
};
use chronicle::service_logs::ServiceLogs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use drafter::report::audit::{PROMPT_SNAPSHOT, RESPONSE_SNAPSHOT};
use drafter::report::{AuditTrail, ContextAssembler};
use drafter::server::services::{Generator, HashingEmbedder, MemoryVectorDatabase, PlaybookIndex};
use drafter::server::{create_router, AppState};
use drafter::{DrafterError, ReportService, Result};

/// What the stub oracle answers with
#[derive(Clone, Copy)]
enum Oracle {
  Draft,
  Down,
  Slow,
}

#[async_trait]
impl Generator for Oracle {
  async fn generate(&self, prompt: &str) -> Result<String> {
    match self {
      Oracle::Draft => {
        Ok(format!("Title: Phishing\nDate: 2026-10-17\nPrompt bytes: {}", prompt.len()))
      }
      Oracle::Down => Err(DrafterError::generation_unavailable("API error 401 Unauthorized")),
      Oracle::Slow => Err(DrafterError::generation_timeout(1200)),
    }
  }
}

fn fixture(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn app(oracle: Oracle, temp_dir: &TempDir) -> Router {
  let index = Arc::new(PlaybookIndex::new(
    Arc::new(MemoryVectorDatabase::new("soc_playbooks_v6")),
    Arc::new(HashingEmbedder::new(256)),
    fixture("playbooks.json"),
  ));
  let service = ReportService::new(
    index,
    ContextAssembler::default(),
    Arc::new(oracle),
    AuditTrail::new(temp_dir.path().join("outputs")),
    2,
  );
  let logs = ServiceLogs::new_with_silent(temp_dir.path().join("server.logs.jsonl"), true).unwrap();
  create_router(AppState::new(Arc::new(service), logs))
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(body.into())
    .unwrap()
}

fn get(uri: &str) -> Request<Body> {
  Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn request_body() -> String {
  std::fs::read_to_string(fixture("request.json")).unwrap()
}

#[tokio::test]
async fn test_draft_returns_plain_text() {
  let temp_dir = TempDir::new().unwrap();
  let response =
    app(Oracle::Draft, &temp_dir).oneshot(post("/reports/draft", request_body())).await.unwrap();

  assert_eq!(response.status(), StatusCode::OK);
  let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
  assert!(content_type.starts_with("text/plain"));
  assert!(body_text(response).await.starts_with("Title: Phishing"));
  assert!(temp_dir.path().join("outputs").join(PROMPT_SNAPSHOT).exists());
}

#[tokio::test]
async fn test_legacy_llm_path_accepts_ui_envelope() {
  let temp_dir = TempDir::new().unwrap();
  let envelope = serde_json::json!({
    "initial_analysis": "User clicked a credential phishing link.",
    "log_lines": ["08:03 proxy GET https://acme-login.example.net/auth"],
    "siem_alert": {"raw": [{"type": "phishing", "Customer": "ACME Corp, mdr_contract_type=XDR"}]}
  });

  let response =
    app(Oracle::Draft, &temp_dir).oneshot(post("/llm", envelope.to_string())).await.unwrap();

  assert_eq!(response.status(), StatusCode::OK);
  let prompt =
    std::fs::read_to_string(temp_dir.path().join("outputs").join(PROMPT_SNAPSHOT)).unwrap();
  assert!(prompt.contains("ACME Corp, mdr_contract_type=XDR"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
  let temp_dir = TempDir::new().unwrap();
  let response =
    app(Oracle::Draft, &temp_dir).oneshot(post("/reports/draft", "{oops")).await.unwrap();

  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
  assert!(body_text(response).await.contains("bad json"));
}

#[tokio::test]
async fn test_generation_failures_map_to_gateway_errors() {
  let temp_dir = TempDir::new().unwrap();
  let response =
    app(Oracle::Down, &temp_dir).oneshot(post("/reports/draft", request_body())).await.unwrap();
  assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

  let response =
    app(Oracle::Slow, &temp_dir).oneshot(post("/reports/draft", request_body())).await.unwrap();
  assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
  assert!(!temp_dir.path().join("outputs").join(RESPONSE_SNAPSHOT).exists());
}

#[tokio::test]
async fn test_status_reports_collection() {
  let temp_dir = TempDir::new().unwrap();
  let response = app(Oracle::Draft, &temp_dir).oneshot(get("/status")).await.unwrap();

  assert_eq!(response.status(), StatusCode::OK);
  let json = body_json(response).await;
  assert_eq!(json["status"], "healthy");
  assert_eq!(json["collection"], "soc_playbooks_v6");
  assert_eq!(json["embedding_model"], "hashing-256");
  assert_eq!(json["populated"], false);
}

#[tokio::test]
async fn test_index_then_search() {
  let temp_dir = TempDir::new().unwrap();
  let app = app(Oracle::Draft, &temp_dir);

  let response = app.clone().oneshot(post("/playbooks/index", "")).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let json = body_json(response).await;
  assert_eq!(json["count"], 4);
  assert_eq!(json["inserted"], true);

  let response = app.clone().oneshot(post("/playbooks/index", "")).await.unwrap();
  assert_eq!(body_json(response).await["inserted"], false);

  let search = serde_json::json!({"query": "brute force failed sign-in", "k": 1});
  let response = app.oneshot(post("/playbooks/search", search.to_string())).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let json = body_json(response).await;
  assert_eq!(json["count"], 1);
  assert_eq!(json["results"][0]["id"], "pb-bruteforce");
}

#[tokio::test]
async fn test_logs_record_requests() {
  let temp_dir = TempDir::new().unwrap();
  let app = app(Oracle::Draft, &temp_dir);

  app.clone().oneshot(get("/version")).await.unwrap();
  let response = app.oneshot(get("/logs?limit=10")).await.unwrap();

  assert_eq!(response.status(), StatusCode::OK);
  let json = body_json(response).await;
  let logs = json["logs"].as_array().unwrap();
  assert!(!logs.is_empty());
  assert!(logs.len() <= 10);
}
