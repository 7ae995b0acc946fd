//! REST API types with schemars annotations

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DrafterError;
use crate::server::services::VectorSearchResult;

// Base Response Structure
// ======================

/// Envelope for every JSON endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BaseResponse<T> {
  pub versioning: VersionInfo,

  /// Transaction ID for log correlation
  pub transaction_id: Uuid,

  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub errors: Vec<ApiError>,

  #[serde(flatten)]
  pub data: T,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionInfo {
  pub latest: String,
  pub requested: String,
  pub resolved: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiError {
  /// Stable error key, see `DrafterError::key`
  pub key: String,
  pub message: String,
  #[serde(default)]
  pub context: serde_json::Value,
}

// Status/Version Endpoints
// =======================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionResponse {
  pub version: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
  pub collection: String,
  pub embedding_model: String,
  /// Entries in the collection, absent when the store cannot be reached
  pub documents: Option<usize>,
  pub populated: bool,
}

// Logs Endpoint
// =============

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LogsQuery {
  pub limit: Option<usize>,
  /// Level filter; `all` or absent returns every level
  pub level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LogsResponse {
  pub logs: Vec<LogEntry>,
}

pub type LogEntry = chronicle::service_logs::LogEntry;

// Playbook Endpoints
// ==================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
  pub query: String,
  /// Defaults to the configured `n_results`
  pub k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchResultData {
  pub id: String,
  pub title: String,
  pub content: String,
  pub similarity: f32,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchResponse {
  pub results: Vec<SearchResultData>,
  pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IndexResponse {
  pub collection: String,
  pub count: usize,
  /// True when this call ingested the corpus
  pub inserted: bool,
}

// Helper Functions
// ================

fn version_info() -> VersionInfo {
  let version = env!("CARGO_PKG_VERSION");
  VersionInfo {
    latest: version.to_string(),
    requested: version.to_string(),
    resolved: version.to_string(),
  }
}

impl<T> BaseResponse<T> {
  pub fn success(data: T, transaction_id: Uuid) -> Self {
    Self { versioning: version_info(), transaction_id, errors: Vec::new(), data }
  }

  pub fn error(errors: Vec<ApiError>, transaction_id: Uuid) -> BaseResponse<()> {
    BaseResponse { versioning: version_info(), transaction_id, errors, data: () }
  }
}

impl ApiError {
  pub fn new(key: &str, message: &str) -> Self {
    Self { key: key.to_string(), message: message.to_string(), context: serde_json::Value::Null }
  }
}

impl From<&DrafterError> for ApiError {
  fn from(error: &DrafterError) -> Self {
    Self::new(error.key(), &error.to_string())
  }
}

impl From<VectorSearchResult> for SearchResultData {
  fn from(result: VectorSearchResult) -> Self {
    Self {
      id: result.id,
      title: result.title,
      content: result.content,
      similarity: result.similarity,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_base_response_flattens_data() {
    let response =
      BaseResponse::success(VersionResponse { version: "0.3.0".to_string() }, Uuid::nil());
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["version"], "0.3.0");
    assert!(json.get("errors").is_none());
    assert_eq!(json["versioning"]["latest"], env!("CARGO_PKG_VERSION"));
  }

  #[test]
  fn test_error_response_carries_key() {
    let error = ApiError::from(&DrafterError::empty_corpus("missing file"));
    let response = BaseResponse::<()>::error(vec![error], Uuid::nil());
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["errors"][0]["key"], "empty_corpus");
  }
}
