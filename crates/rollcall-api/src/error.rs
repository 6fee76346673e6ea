//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rollcall_core::student::Student;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A same-name student exists and the request did not confirm that the new
  /// student is someone else.
  #[error("conflict: {message}")]
  Conflict {
    message:  String,
    existing: Box<Student>,
  },

  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl From<rollcall_core::Error> for ApiError {
  fn from(e: rollcall_core::Error) -> Self {
    use rollcall_core::Error as E;
    match e {
      E::StudentNotFound(_) | E::ClassNotFound(_) => Self::NotFound(e.to_string()),
      E::EmptyName => Self::BadRequest(e.to_string()),
      E::SuffixesExhausted(_) | E::AssignedBeforeFirstVisit { .. } => {
        Self::Unprocessable(e.to_string())
      }
      E::Store { .. } => Self::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, Json(json!({ "error": m }))),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))),
      ApiError::Conflict { message, existing } => (
        StatusCode::CONFLICT,
        Json(json!({ "error": message, "existing": existing })),
      ),
      ApiError::Unprocessable(m) => {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": m })))
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure while handling request");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
      }
    }
    .into_response()
  }
}
