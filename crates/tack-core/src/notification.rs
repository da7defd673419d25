//! Notification events and the fan-out that turns one event into one
//! notification per interested user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  comment::{Comment, CommentId, CommentPath, PinId, UserId},
  store::NotificationStore,
};

pub type NotificationId = i64;

// ─── Payloads ────────────────────────────────────────────────────────────────

/// Someone commented on a pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNote {
  pub comment_id: CommentId,
  pub path:       CommentPath,
  pub content:    String,
  pub pin_id:     PinId,
  pub author_id:  UserId,
}

impl From<&Comment> for CommentNote {
  fn from(c: &Comment) -> Self {
    Self {
      comment_id: c.id,
      path:       c.path.clone(),
      content:    c.content.clone(),
      pin_id:     c.pin_id,
      author_id:  c.author_id,
    }
  }
}

/// A followed user published a pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinNote {
  pub pin_id:    PinId,
  pub title:     String,
  pub img_link:  String,
  pub author_id: UserId,
}

/// Someone started following a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowNote {
  pub follower_id: UserId,
  pub user_id:     UserId,
}

// ─── NoteEvent ───────────────────────────────────────────────────────────────

/// Everything that can produce a notification. The variant name is the
/// `note_type` discriminant stored alongside the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NoteEvent {
  Comment(CommentNote),
  Pin(PinNote),
  Follow(FollowNote),
}

impl NoteEvent {
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Comment(_) => "comment",
      Self::Pin(_) => "pin",
      Self::Follow(_) => "follow",
    }
  }

  /// The user whose action produced the event.
  pub fn actor_id(&self) -> UserId {
    match self {
      Self::Comment(c) => c.author_id,
      Self::Pin(p) => p.author_id,
      Self::Follow(f) => f.follower_id,
    }
  }

  /// Serialise the inner payload (without the type tag) for storage.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let data = match self {
      Self::Comment(c) => serde_json::to_value(c)?,
      Self::Pin(p) => serde_json::to_value(p)?,
      Self::Follow(f) => serde_json::to_value(f)?,
    };
    Ok(data)
  }

  /// Rebuild an event from its stored discriminant and payload.
  pub fn from_parts(discriminant: &str, data: serde_json::Value) -> Result<Self> {
    if !matches!(discriminant, "comment" | "pin" | "follow") {
      return Err(Error::UnknownNoteType(discriminant.to_owned()));
    }
    let wrapped = serde_json::json!({ "type": discriminant, "data": data });
    Ok(serde_json::from_value(wrapped)?)
  }
}

// ─── Notification ────────────────────────────────────────────────────────────

/// One event delivered to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: NotificationId,
  pub to_user_id:      UserId,
  pub event:           NoteEvent,
  pub created_at:      DateTime<Utc>,
  pub is_read:         bool,
}

// ─── Fan-out ─────────────────────────────────────────────────────────────────

/// The users who should hear about `event`, never including its actor.
///
/// - a comment goes to the owner of the pin;
/// - a new pin goes to everyone following its author;
/// - a follow goes to the followed user.
pub async fn recipients<S>(store: &S, event: &NoteEvent) -> Result<Vec<UserId>, S::Error>
where
  S: NotificationStore,
{
  let mut to = match event {
    NoteEvent::Comment(c) => vec![store.pin_owner(c.pin_id).await?],
    NoteEvent::Pin(p) => store.followers(p.author_id).await?,
    NoteEvent::Follow(f) => vec![f.user_id],
  };

  let actor = event.actor_id();
  to.retain(|&id| id != actor);
  to.sort_unstable();
  to.dedup();
  Ok(to)
}

/// Resolve the recipients of `event` and store a notification for each.
pub async fn notify<S>(store: &S, event: &NoteEvent) -> Result<Vec<Notification>, S::Error>
where
  S: NotificationStore,
{
  let to = recipients(store, event).await?;
  let mut stored = Vec::with_capacity(to.len());
  for user_id in to {
    stored.push(store.store_notification(user_id, event).await?);
  }
  Ok(stored)
}
