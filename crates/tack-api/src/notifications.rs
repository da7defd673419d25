//! Handlers for `/notifications` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/notifications` | Acting user's notifications, newest first |
//! | `POST` | `/notifications` | Body: a [`NoteEvent`] whose actor is the acting user; fans out, returns 201 + stored notifications |
//! | `POST` | `/notifications/:id/read` | 204; 404 if not the acting user's |
//! | `POST` | `/notifications/read` | Marks all of the acting user's notifications read |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use tack_core::{
  notification::{self, NoteEvent, Notification, NotificationId},
  store::NotificationStore,
};

use crate::{TackStore, error::ApiError, user::ActingUser};

/// `GET /notifications`
pub async fn list<S: TackStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
) -> Result<Json<Vec<Notification>>, ApiError> {
  let notes = store
    .notifications_for(user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(notes))
}

/// `POST /notifications`: entry point for the pin and follow flows, which
/// publish their events here. Users may only publish their own actions.
pub async fn create<S: TackStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Json(event): Json<NoteEvent>,
) -> Result<impl IntoResponse, ApiError> {
  if event.actor_id() != user_id {
    return Err(ApiError::Forbidden(format!(
      "user {user_id} cannot publish a {} event for user {}",
      event.discriminant(),
      event.actor_id()
    )));
  }

  let sent = notification::notify(store.as_ref(), &event)
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(kind = event.discriminant(), recipients = sent.len(), "notifications sent");
  Ok((StatusCode::CREATED, Json(sent)))
}

/// `POST /notifications/:id/read`
pub async fn mark_read<S: TackStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path(id): Path<NotificationId>,
) -> Result<StatusCode, ApiError> {
  store
    .mark_read(user_id, id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /notifications/read`
pub async fn mark_all_read<S: TackStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
) -> Result<StatusCode, ApiError> {
  store
    .mark_all_read(user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
