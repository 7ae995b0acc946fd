//! Axum router configuration for all endpoints

use axum::{
  middleware::from_fn_with_state,
  routing::{get, post},
  Router,
};
use chronicle::service_logs::ServiceLogs;
use std::sync::Arc;

use crate::pipeline::ReportService;
use crate::server::handlers::{logs, playbooks, report, status};
use crate::server::middleware::request_context_middleware;

/// Shared state constructed once at startup
#[derive(Clone)]
pub struct AppState {
  pub service: Arc<ReportService>,
  pub logs: ServiceLogs,
}

impl AppState {
  pub fn new(service: Arc<ReportService>, logs: ServiceLogs) -> Self {
    Self { service, logs }
  }
}

pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    .route("/logs", get(logs::get_logs))
    // Drafting; /llm is the path older clients post to
    .route("/reports/draft", post(report::draft_report))
    .route("/llm", post(report::draft_report))
    // Playbook collection
    .route("/playbooks/search", post(playbooks::search_playbooks))
    .route("/playbooks/index", post(playbooks::index_playbooks))
    .layer(from_fn_with_state(state.clone(), request_context_middleware))
    .with_state(state)
}
