//! Handlers for comment endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/pins/:pin_id/comments` | Body: [`CreateBody`]; returns 201 + stored comment |
//! | `GET`  | `/pins/:pin_id/comments` | Whole thread, ordered by path |
//! | `GET`  | `/comments/:id` | Single comment; 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tack_core::{
  comment::{Comment, CommentId, NewComment, PinId},
  notification::{self, CommentNote, NoteEvent},
  store::{CommentStore, NotificationStore},
};

use crate::{TackStore, error::ApiError, user::ActingUser};

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /pins/:pin_id/comments`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub content:   String,
  /// Comment being replied to; absent for a new thread.
  pub parent_id: Option<CommentId>,
}

/// `POST /pins/:pin_id/comments` starts a thread, or replies when
/// `parent_id` is set. The pin's owner is notified.
pub async fn create<S: TackStore>(
  State(store): State<Arc<S>>,
  ActingUser(author_id): ActingUser,
  Path(pin_id): Path<PinId>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let content = body.content.trim();
  if content.is_empty() {
    return Err(ApiError::BadRequest("comment content must not be empty".into()));
  }

  // Rejects unknown pins with 404 rather than a constraint failure.
  store.pin_owner(pin_id).await.map_err(ApiError::store)?;

  let input = NewComment::new(content, pin_id, author_id);
  let comment = match body.parent_id {
    None => store.create_root(input).await,
    Some(parent_id) => store.create_child(input, parent_id).await,
  }
  .map_err(ApiError::store)?;

  let event = NoteEvent::Comment(CommentNote::from(&comment));
  if let Err(e) = notification::notify(store.as_ref(), &event).await {
    tracing::warn!(comment_id = comment.id, error = %e, "comment notification failed");
  }

  Ok((StatusCode::CREATED, Json(comment)))
}

// ─── Thread ───────────────────────────────────────────────────────────────────

/// `GET /pins/:pin_id/comments`
pub async fn thread<S: TackStore>(
  State(store): State<Arc<S>>,
  Path(pin_id): Path<PinId>,
) -> Result<Json<Vec<Comment>>, ApiError> {
  let comments = store.get_thread(pin_id).await.map_err(ApiError::store)?;
  Ok(Json(comments))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /comments/:id`
pub async fn get_one<S: TackStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<CommentId>,
) -> Result<Json<Comment>, ApiError> {
  let comment = store.get_comment(id).await.map_err(ApiError::store)?;
  Ok(Json(comment))
}
