//! Error types for `tack-core`, and the classification every backend's error
//! type reports to the layers above it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("comment path is empty")]
  EmptyPath,

  #[error("malformed comment path segment: {0:?}")]
  MalformedPath(String),

  #[error("comment ids must be non-negative, got {0}")]
  NegativeId(i64),

  #[error("unknown notification type discriminant: {0:?}")]
  UnknownNoteType(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Backend-independent category of a store failure.
///
/// The API layer maps these onto status codes; nothing in the workspace
/// retries on any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Connectivity or engine failure.
  StorageUnavailable,
  /// A child comment named a parent that does not exist. The row that was
  /// optimistically inserted has already been removed.
  ParentNotFound,
  /// The compensating delete after a [`ErrorKind::ParentNotFound`] failed.
  /// The write was rolled back instead.
  CompensationFailed,
  /// The write referenced a user or pin that does not exist, or otherwise
  /// violated a constraint. Retrying the same request cannot succeed.
  Invalid,
  /// The requested comment, pin or notification does not exist.
  NotFound,
  /// Stored data could not be decoded.
  Internal,
}

/// Implemented by the error type of every store backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;
}
