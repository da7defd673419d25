//! The `CommentStore` and `NotificationStore` traits.
//!
//! Implemented by storage backends (e.g. `tack-store-sqlite`). The API layer
//! depends on these abstractions, not on any concrete backend.

use std::future::Future;

use crate::{
  comment::{Comment, CommentId, NewComment, PinId, UserId},
  error::StoreError,
  notification::{NoteEvent, Notification, NotificationId},
};

// ─── Comments ────────────────────────────────────────────────────────────────

/// A threaded comment store built on materialised paths.
///
/// Comments are written once and never updated. The only delete a backend may
/// issue is the compensating one inside [`CommentStore::create_child`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CommentStore: Send + Sync {
  type Error: StoreError;

  /// Start a new thread. The store draws a fresh id and writes the row with
  /// `path == [id]` in one atomic unit.
  fn create_root(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Reply to `parent_id`. The new row's path is the parent's path extended
  /// with the new id, computed against a single snapshot of the parent.
  ///
  /// Fails with a [`ParentNotFound`](crate::ErrorKind::ParentNotFound) error
  /// if the parent does not exist, after making sure no row was left behind.
  fn create_child(
    &self,
    input: NewComment,
    parent_id: CommentId,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Retrieve a comment with its author's name.
  fn get_comment(
    &self,
    id: CommentId,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Every comment on a pin, ordered by path: a depth-first pre-order of the
  /// pin's comment forest.
  ///
  /// An existing pin with no comments yields an empty vector; a pin that does
  /// not exist is a [`NotFound`](crate::ErrorKind::NotFound) error.
  fn get_thread(
    &self,
    pin_id: PinId,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;
}

// ─── Notifications ───────────────────────────────────────────────────────────

/// Persistence for notifications plus the two lookups needed to decide who
/// receives them.
pub trait NotificationStore: Send + Sync {
  type Error: StoreError;

  /// The user who created `pin_id`.
  fn pin_owner(
    &self,
    pin_id: PinId,
  ) -> impl Future<Output = Result<UserId, Self::Error>> + Send + '_;

  /// Ids of every user following `user_id`.
  fn followers(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<UserId>, Self::Error>> + Send + '_;

  /// Persist one unread notification of `event` addressed to `to_user_id`.
  fn store_notification<'a>(
    &'a self,
    to_user_id: UserId,
    event: &'a NoteEvent,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + 'a;

  /// All notifications addressed to `user_id`, newest first.
  fn notifications_for(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  /// Mark one of `user_id`'s notifications read. A notification addressed
  /// to someone else is reported as not found.
  fn mark_read(
    &self,
    user_id: UserId,
    notification_id: NotificationId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn mark_all_read(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
