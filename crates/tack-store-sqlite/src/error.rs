//! Error type for `tack-store-sqlite`.

use tack_core::{
  ErrorKind, StoreError,
  comment::{CommentId, PinId},
  notification::NotificationId,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tack_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("parent comment not found: {0}")]
  ParentNotFound(CommentId),

  /// The row inserted under a missing parent could not be removed, so the
  /// whole insert transaction was rolled back.
  #[error("failed to remove comment {comment_id} inserted under missing parent {parent_id}: {source}")]
  CompensationFailed {
    comment_id: CommentId,
    parent_id:  CommentId,
    #[source]
    source:     rusqlite::Error,
  },

  #[error("comment not found: {0}")]
  CommentNotFound(CommentId),

  #[error("pin not found: {0}")]
  PinNotFound(PinId),

  #[error("notification not found: {0}")]
  NotificationNotFound(NotificationId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Database(e) if is_constraint_violation(e) => ErrorKind::Invalid,
      Error::Database(_) => ErrorKind::StorageUnavailable,
      Error::ParentNotFound(_) => ErrorKind::ParentNotFound,
      Error::CompensationFailed { .. } => ErrorKind::CompensationFailed,
      Error::CommentNotFound(_)
      | Error::PinNotFound(_)
      | Error::NotificationNotFound(_) => ErrorKind::NotFound,
      Error::Core(_) | Error::Json(_) | Error::DateParse(_) => ErrorKind::Internal,
    }
  }
}

/// Foreign key, unique and check failures: the request itself is at fault.
fn is_constraint_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, _))
      if failure.code == rusqlite::ErrorCode::ConstraintViolation
  )
}
