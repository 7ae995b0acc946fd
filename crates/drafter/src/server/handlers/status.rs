//! Status and version endpoint handlers

use axum::{extract::State, response::Json};
use uuid::Uuid;

use crate::server::routing::AppState;
use crate::server::types::{BaseResponse, StatusResponse, VersionResponse};

/// GET /status - Health check with collection details
pub async fn status(State(state): State<AppState>) -> Json<BaseResponse<StatusResponse>> {
  let index = state.service.index();
  let documents = index.count().await.ok();

  let response = StatusResponse {
    status: if documents.is_some() { "healthy" } else { "degraded" }.to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    collection: index.collection(),
    embedding_model: index.embedding_model(),
    documents,
    populated: index.is_populated(),
  };

  Json(BaseResponse::success(response, Uuid::new_v4()))
}

/// GET /version - Current API version
pub async fn version() -> Json<BaseResponse<VersionResponse>> {
  let response = VersionResponse { version: env!("CARGO_PKG_VERSION").to_string() };
  Json(BaseResponse::success(response, Uuid::new_v4()))
}
