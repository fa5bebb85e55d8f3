//! Error types for `telos-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown {field} discriminant: {value:?}")]
  UnknownDiscriminant {
    field: &'static str,
    value: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Failure taxonomy ────────────────────────────────────────────────────────

/// The three ways a coordinated write can fail, independent of backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  /// Update or delete targeted an identifier absent from storage.
  NotFound,
  /// A write would violate a uniqueness or foreign-key constraint.
  ConstraintViolation,
  /// The backend failed for reasons outside constraint checking.
  TransactionFailure,
}

/// Implemented by every backend error so callers can react to a failure
/// without knowing which store produced it.
pub trait Classify {
  fn kind(&self) -> FailureKind;
}
