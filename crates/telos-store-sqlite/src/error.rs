//! Error type for `telos-store-sqlite`.

use rusqlite::ErrorCode;
use telos_core::{Classify, FailureKind};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] telos_core::Error),

  /// Update or delete targeted a graph that does not exist.
  #[error("{entity} not found: {id}")]
  NotFound {
    entity: &'static str,
    id:     Uuid,
  },

  /// A UNIQUE, FOREIGN KEY, NOT NULL or CHECK constraint rejected a write.
  #[error("constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
    Self::NotFound { entity, id }
  }
}

impl From<rusqlite::Error> for Error {
  fn from(err: rusqlite::Error) -> Self {
    match err {
      rusqlite::Error::SqliteFailure(ref failure, ref message)
        if failure.code == ErrorCode::ConstraintViolation =>
      {
        Self::ConstraintViolation(
          message.clone().unwrap_or_else(|| failure.to_string()),
        )
      }
      other => Self::Database(tokio_rusqlite::Error::Rusqlite(other)),
    }
  }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Rusqlite(inner) => inner.into(),
      other => Self::Database(other),
    }
  }
}

impl Classify for Error {
  fn kind(&self) -> FailureKind {
    match self {
      Self::NotFound { .. } => FailureKind::NotFound,
      Self::ConstraintViolation(_) => FailureKind::ConstraintViolation,
      // Rows we wrote but cannot read back are a storage failure too.
      Self::Core(_)
      | Self::Database(_)
      | Self::Json(_)
      | Self::Uuid(_)
      | Self::DateParse(_) => FailureKind::TransactionFailure,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sqlite_failure(code: std::os::raw::c_int, message: &str) -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(
      rusqlite::ffi::Error::new(code),
      Some(message.to_owned()),
    )
  }

  #[test]
  fn foreign_key_failure_is_a_constraint_violation() {
    let err: Error = sqlite_failure(
      rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
      "FOREIGN KEY constraint failed",
    )
    .into();
    assert_eq!(err.kind(), FailureKind::ConstraintViolation);
    assert_eq!(err.to_string(), "constraint violation: FOREIGN KEY constraint failed");
  }

  #[test]
  fn wrapped_unique_failure_is_a_constraint_violation() {
    let err: Error = tokio_rusqlite::Error::Rusqlite(sqlite_failure(
      rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
      "UNIQUE constraint failed: goal_relevances.goal_id, goal_relevances.value_id",
    ))
    .into();
    assert!(matches!(err, Error::ConstraintViolation(_)));
  }

  #[test]
  fn io_failure_is_a_transaction_failure() {
    let err: Error = sqlite_failure(rusqlite::ffi::SQLITE_IOERR, "disk I/O error").into();
    assert_eq!(err.kind(), FailureKind::TransactionFailure);
  }

  #[test]
  fn closed_connection_is_a_transaction_failure() {
    let err: Error = tokio_rusqlite::Error::ConnectionClosed.into();
    assert_eq!(err.kind(), FailureKind::TransactionFailure);
  }
}
