//! Report drafting endpoint
//!
//! Answers in plain text either way: the draft on success, the error message
//! with a matching status on failure. The body is parsed by hand so that
//! malformed JSON also gets a plain-text 400.

use axum::{
  body::Bytes,
  extract::{Extension, State},
  http::{header, StatusCode},
  response::{IntoResponse, Response},
};

use super::status_of;
use crate::report::context_from_slice;
use crate::server::{middleware::RequestContext, routing::AppState};

const COMPONENT: &str = "reports-api";

/// POST /reports/draft (and /llm)
pub async fn draft_report(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  body: Bytes,
) -> Response {
  let report_context = match context_from_slice(&body) {
    Ok(report_context) => report_context,
    Err(e) => {
      context.log_warn(&format!("Rejected draft request: {e}"), COMPONENT).await;
      return plain_text(status_of(&e), format!("{e}\n"));
    }
  };

  context
    .log_info(
      &format!("Drafting report for '{}', waiting on generation", report_context.user_query),
      COMPONENT,
    )
    .await;

  match state.service.draft(&report_context).await {
    Ok(draft) => {
      context.log_success(&format!("Draft generated ({} bytes)", draft.len()), COMPONENT).await;
      plain_text(StatusCode::OK, draft)
    }
    Err(e) => {
      context.log_error(&format!("Draft failed: {e}"), COMPONENT).await;
      plain_text(status_of(&e), format!("{e}\n"))
    }
  }
}

fn plain_text(status: StatusCode, body: String) -> Response {
  (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}
