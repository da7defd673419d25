//! Extractor for the user on whose behalf a request is made.
//!
//! Session handling lives in front of this API; by the time a request arrives
//! here the authenticated user's id has been placed in [`USER_ID_HEADER`].

use axum::{extract::FromRequestParts, http::request::Parts};
use tack_core::comment::UserId;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The acting user's id. Rejects with 401 when the header is missing or not
/// an integer.
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub UserId);

impl<S> FromRequestParts<S> for ActingUser
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .headers
      .get(USER_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .and_then(|s| s.trim().parse().ok())
      .map(ActingUser)
      .ok_or(ApiError::Unauthorized)
  }
}
