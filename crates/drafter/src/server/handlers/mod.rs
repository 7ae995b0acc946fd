pub mod logs;
pub mod playbooks;
pub mod report;
pub mod status;

use axum::http::StatusCode;

use crate::error::DrafterError;

pub(crate) fn status_of(error: &DrafterError) -> StatusCode {
  StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
