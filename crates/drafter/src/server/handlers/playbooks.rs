//! Playbook collection endpoint handlers

use axum::{
  extract::{Extension, Json, State},
  http::StatusCode,
  response::Json as ResponseJson,
};
use uuid::Uuid;

use super::status_of;
use crate::error::DrafterError;
use crate::server::services::PopulateOutcome;
use crate::server::types::{
  BaseResponse, IndexResponse, SearchRequest, SearchResponse, SearchResultData,
};
use crate::server::{middleware::RequestContext, routing::AppState};

const COMPONENT: &str = "playbooks-api";

type ErrorResponse = (StatusCode, ResponseJson<BaseResponse<()>>);

fn error_response(error: &DrafterError, transaction_id: Uuid) -> ErrorResponse {
  (status_of(error), ResponseJson(BaseResponse::<()>::error(vec![error.into()], transaction_id)))
}

/// POST /playbooks/search - Nearest playbooks to a free-text query
pub async fn search_playbooks(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<SearchRequest>,
) -> Result<ResponseJson<BaseResponse<SearchResponse>>, ErrorResponse> {
  let transaction_id = Uuid::new_v4();
  let k = request.k.unwrap_or_else(|| state.service.n_results());

  context.log_info(&format!("Searching playbooks: '{}' (k={k})", request.query), COMPONENT).await;

  match state.service.index().search(&request.query, k).await {
    Ok(results) => {
      let results: Vec<SearchResultData> = results.into_iter().map(Into::into).collect();
      context.log_success(&format!("Found {} playbooks", results.len()), COMPONENT).await;
      let response = SearchResponse { count: results.len(), results };
      Ok(ResponseJson(BaseResponse::success(response, transaction_id)))
    }
    Err(e) => {
      context.log_error(&format!("Playbook search failed: {e}"), COMPONENT).await;
      Err(error_response(&e, transaction_id))
    }
  }
}

/// POST /playbooks/index - Populate the collection if it is empty
pub async fn index_playbooks(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> Result<ResponseJson<BaseResponse<IndexResponse>>, ErrorResponse> {
  let transaction_id = Uuid::new_v4();
  let index = state.service.index();

  match index.ensure_populated().await {
    Ok(outcome) => {
      let inserted = matches!(outcome, PopulateOutcome::Inserted { .. });
      context
        .log_success(
          &format!("Collection '{}' holds {} playbooks", index.collection(), outcome.count()),
          COMPONENT,
        )
        .await;
      let response =
        IndexResponse { collection: index.collection(), count: outcome.count(), inserted };
      Ok(ResponseJson(BaseResponse::success(response, transaction_id)))
    }
    Err(e) => {
      context.log_error(&format!("Indexing failed: {e}"), COMPONENT).await;
      Err(error_response(&e, transaction_id))
    }
  }
}
