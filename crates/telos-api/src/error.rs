//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use telos_core::{Classify, FailureKind, validate::ValidationError};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// The form broke a business rule; nothing was written.
  #[error(transparent)]
  Invalid(#[from] ValidationError),

  /// The store rejected the write (unknown reference, duplicate link).
  #[error("conflict: {0}")]
  Conflict(String),

  /// The request itself could not be decoded: bad JSON, path or query.
  #[error("{1}")]
  Rejected(StatusCode, String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a coordinator failure onto the matching HTTP error.
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    match err.kind() {
      FailureKind::NotFound => Self::NotFound(err.to_string()),
      FailureKind::ConstraintViolation => Self::Conflict(err.to_string()),
      FailureKind::TransactionFailure => Self::Store(Box::new(err)),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Rejected(rejection.status(), rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::Rejected(rejection.status(), rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self::Rejected(rejection.status(), rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::Invalid(e) => {
        let fields: Vec<_> = e
          .0
          .iter()
          .map(|f| json!({ "field": f.field, "reason": f.reason }))
          .collect();
        (
          StatusCode::UNPROCESSABLE_ENTITY,
          json!({ "error": e.to_string(), "fields": fields }),
        )
      }
      ApiError::Conflict(m) => (StatusCode::CONFLICT, json!({ "error": m })),
      ApiError::Rejected(status, m) => (*status, json!({ "error": m })),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() }))
      }
    };
    (status, Json(body)).into_response()
  }
}
