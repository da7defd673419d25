//! HTTP server for Tack.
//!
//! Mounts the [`tack_api`] router under `/api` behind request tracing.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use serde::Deserialize;
use tack_api::TackStore;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and `TACK_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application [`Router`] for `store`.
pub fn router<S: TackStore>(store: Arc<S>) -> Router {
  Router::new()
    .nest("/api", tack_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use serde_json::{Value, json};
  use tack_api::USER_ID_HEADER;
  use tack_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  struct Fixture {
    store: Arc<SqliteStore>,
    alice: i64,
    bob:   i64,
    pin:   i64,
  }

  /// Alice owns one pin; Bob is another user.
  async fn fixture() -> Fixture {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let alice = store.add_user("alice").await.unwrap();
    let bob   = store.add_user("bob").await.unwrap();
    let pin   = store.add_pin(alice, "cast iron care").await.unwrap();
    Fixture { store: Arc::new(store), alice, bob, pin }
  }

  async fn oneshot_raw(
    store:  &Arc<SqliteStore>,
    method: &str,
    uri:    &str,
    user:   Option<i64>,
    body:   Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
      builder = builder.header(USER_ID_HEADER, id.to_string());
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    router(store.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn post_comment(
    fx:        &Fixture,
    user:      i64,
    content:   &str,
    parent_id: Option<i64>,
  ) -> Response {
    oneshot_raw(
      &fx.store,
      "POST",
      &format!("/api/pins/{}/comments", fx.pin),
      Some(user),
      Some(json!({ "content": content, "parent_id": parent_id })),
    )
    .await
  }

  // ── Comments ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn post_root_comment_returns_201() {
    let fx = fixture().await;
    let resp = post_comment(&fx, fx.bob, "  hello  ", None).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = json_body(resp).await;
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["path"], json!([id]));
    assert_eq!(body["content"], "hello");
    assert_eq!(body["author_name"], "bob");

    let resp = oneshot_raw(&fx.store, "GET", &format!("/api/comments/{id}"), None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["path"], json!([id]));
  }

  #[tokio::test]
  async fn thread_lists_replies_in_tree_order() {
    let fx = fixture().await;
    let root = json_body(post_comment(&fx, fx.alice, "root", None).await).await;
    let root_id = root["id"].as_i64().unwrap();

    let a = json_body(post_comment(&fx, fx.bob, "a", Some(root_id)).await).await;
    let a_id = a["id"].as_i64().unwrap();
    let b = json_body(post_comment(&fx, fx.bob, "b", Some(root_id)).await).await;
    let a1 = json_body(post_comment(&fx, fx.alice, "a1", Some(a_id)).await).await;
    assert_eq!(a1["path"], json!([root_id, a_id, a1["id"].clone()]));

    let resp = oneshot_raw(
      &fx.store,
      "GET",
      &format!("/api/pins/{}/comments", fx.pin),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let thread = json_body(resp).await;
    let contents: Vec<_> = thread
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["content"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(contents, ["root", "a", "a1", "b"]);
    assert_eq!(thread[3]["id"], b["id"]);
  }

  #[tokio::test]
  async fn reply_to_missing_parent_returns_404() {
    let fx = fixture().await;
    post_comment(&fx, fx.alice, "root", None).await;

    let resp = post_comment(&fx, fx.bob, "lost", Some(999)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err = json_body(resp).await;
    assert!(err["error"].as_str().unwrap().contains("999"), "{err}");

    let resp = oneshot_raw(
      &fx.store,
      "GET",
      &format!("/api/pins/{}/comments", fx.pin),
      None,
      None,
    )
    .await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn blank_content_returns_400() {
    let fx = fixture().await;
    let resp = post_comment(&fx, fx.bob, "   ", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn missing_acting_user_returns_401() {
    let fx = fixture().await;
    let resp = oneshot_raw(
      &fx.store,
      "POST",
      &format!("/api/pins/{}/comments", fx.pin),
      None,
      Some(json!({ "content": "anon" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn unknown_pin_returns_404() {
    let fx = fixture().await;
    let resp = oneshot_raw(
      &fx.store,
      "POST",
      "/api/pins/4040/comments",
      Some(fx.bob),
      Some(json!({ "content": "where" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = oneshot_raw(&fx.store, "GET", "/api/pins/4040/comments", None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn empty_thread_returns_empty_list() {
    let fx = fixture().await;
    let resp = oneshot_raw(
      &fx.store,
      "GET",
      &format!("/api/pins/{}/comments", fx.pin),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!([]));
  }

  #[tokio::test]
  async fn unknown_author_returns_400() {
    let fx = fixture().await;
    let resp = post_comment(&fx, 777, "who am i", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn reply_under_another_pin_returns_404() {
    let fx = fixture().await;
    let other = fx.store.add_pin(fx.alice, "enamel").await.unwrap();
    let root = json_body(
      oneshot_raw(
        &fx.store,
        "POST",
        &format!("/api/pins/{other}/comments"),
        Some(fx.alice),
        Some(json!({ "content": "root" })),
      )
      .await,
    )
    .await;

    let resp = post_comment(&fx, fx.bob, "stray", root["id"].as_i64()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = oneshot_raw(
      &fx.store,
      "GET",
      &format!("/api/pins/{}/comments", fx.pin),
      None,
      None,
    )
    .await;
    assert_eq!(json_body(resp).await, json!([]));
  }

  #[tokio::test]
  async fn get_missing_comment_returns_404() {
    let fx = fixture().await;
    let resp = oneshot_raw(&fx.store, "GET", "/api/comments/12", None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Notifications ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn comment_notifies_pin_owner_and_can_be_read() {
    let fx = fixture().await;
    post_comment(&fx, fx.bob, "nice pin", None).await;

    let resp = oneshot_raw(&fx.store, "GET", "/api/notifications", Some(fx.alice), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let inbox = json_body(resp).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["event"]["type"], "comment");
    assert_eq!(inbox[0]["event"]["data"]["content"], "nice pin");
    assert_eq!(inbox[0]["is_read"], false);
    let note_id = inbox[0]["notification_id"].as_i64().unwrap();

    // Bob cannot mark Alice's notification.
    let resp = oneshot_raw(
      &fx.store,
      "POST",
      &format!("/api/notifications/{note_id}/read"),
      Some(fx.bob),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = oneshot_raw(
      &fx.store,
      "POST",
      &format!("/api/notifications/{note_id}/read"),
      Some(fx.alice),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = oneshot_raw(&fx.store, "GET", "/api/notifications", Some(fx.alice), None).await;
    assert_eq!(json_body(resp).await[0]["is_read"], true);

    // Alice's own reply does not notify her.
    post_comment(&fx, fx.alice, "thanks", None).await;
    let resp = oneshot_raw(&fx.store, "GET", "/api/notifications", Some(fx.alice), None).await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn posted_follow_event_fans_out() {
    let fx = fixture().await;
    let event = json!({
      "type": "follow",
      "data": { "follower_id": fx.bob, "user_id": fx.alice },
    });

    let resp =
      oneshot_raw(&fx.store, "POST", "/api/notifications", Some(fx.bob), Some(event)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let sent = json_body(resp).await;
    assert_eq!(sent.as_array().unwrap().len(), 1);
    assert_eq!(sent[0]["to_user_id"], fx.alice);

    let resp = oneshot_raw(&fx.store, "POST", "/api/notifications/read", Some(fx.alice), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = oneshot_raw(&fx.store, "GET", "/api/notifications", Some(fx.alice), None).await;
    assert_eq!(json_body(resp).await[0]["is_read"], true);
  }

  #[tokio::test]
  async fn events_for_other_users_are_refused() {
    let fx = fixture().await;
    let event = json!({
      "type": "comment",
      "data": {
        "comment_id": 1,
        "path":       [1],
        "content":    "not mine",
        "pin_id":     fx.pin,
        "author_id":  fx.bob,
      },
    });

    let resp =
      oneshot_raw(&fx.store, "POST", "/api/notifications", None, Some(event.clone())).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let carol = fx.store.add_user("carol").await.unwrap();
    let resp =
      oneshot_raw(&fx.store, "POST", "/api/notifications", Some(carol), Some(event)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = oneshot_raw(&fx.store, "GET", "/api/notifications", Some(fx.alice), None).await;
    assert_eq!(json_body(resp).await, json!([]));
  }
}
