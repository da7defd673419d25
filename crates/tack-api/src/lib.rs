//! JSON REST API for Tack's comment threads and notifications.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`CommentStore`] and [`NotificationStore`]. Sessions, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tack_api::api_router(store.clone()))
//! ```

pub mod comments;
pub mod error;
pub mod notifications;
pub mod user;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tack_core::store::{CommentStore, NotificationStore};

pub use error::ApiError;
pub use user::{ActingUser, USER_ID_HEADER};

/// Everything a backend must provide to serve the API.
pub trait TackStore: CommentStore + NotificationStore + 'static {}

impl<S> TackStore for S where S: CommentStore + NotificationStore + 'static {}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S: TackStore>(store: Arc<S>) -> Router<()> {
  Router::new()
    // Comments
    .route(
      "/pins/{pin_id}/comments",
      get(comments::thread::<S>).post(comments::create::<S>),
    )
    .route("/comments/{id}", get(comments::get_one::<S>))
    // Notifications
    .route(
      "/notifications",
      get(notifications::list::<S>).post(notifications::create::<S>),
    )
    .route("/notifications/read", post(notifications::mark_all_read::<S>))
    .route("/notifications/{id}/read", post(notifications::mark_read::<S>))
    .with_state(store)
}
