//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use tack_core::{ErrorKind, StoreError};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("missing or invalid acting user")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("store error: {source}")]
  Store {
    kind:   ErrorKind,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Wrap a backend error, keeping its classification for the response.
  pub fn store<E: StoreError>(e: E) -> Self {
    ApiError::Store { kind: e.kind(), source: Box::new(e) }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::Store { kind, .. } => match kind {
        ErrorKind::NotFound | ErrorKind::ParentNotFound => StatusCode::NOT_FOUND,
        ErrorKind::Invalid => StatusCode::BAD_REQUEST,
        ErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::CompensationFailed | ErrorKind::Internal => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::NotFound(m) | ApiError::BadRequest(m) | ApiError::Forbidden(m) => m.clone(),
      ApiError::Unauthorized => self.to_string(),
      ApiError::Store { source, .. } => source.to_string(),
    };
    if status.is_server_error() {
      tracing::error!(%status, error = %message, "request failed");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  #[error("stub")]
  struct Stub(ErrorKind);

  impl StoreError for Stub {
    fn kind(&self) -> ErrorKind { self.0 }
  }

  #[test]
  fn store_kinds_map_to_statuses() {
    let cases = [
      (ErrorKind::NotFound, StatusCode::NOT_FOUND),
      (ErrorKind::ParentNotFound, StatusCode::NOT_FOUND),
      (ErrorKind::Invalid, StatusCode::BAD_REQUEST),
      (ErrorKind::StorageUnavailable, StatusCode::SERVICE_UNAVAILABLE),
      (ErrorKind::CompensationFailed, StatusCode::INTERNAL_SERVER_ERROR),
      (ErrorKind::Internal, StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (kind, status) in cases {
      assert_eq!(ApiError::store(Stub(kind)).status(), status, "{kind:?}");
    }
  }
}
