//! [`SqliteStore`], the SQLite implementation of [`CommentStore`] and
//! [`NotificationStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use tack_core::{
  comment::{Comment, CommentId, NewComment, PinId, UserId},
  notification::{NoteEvent, Notification, NotificationId},
  store::{CommentStore, NotificationStore},
};

use crate::{
  Error, Result,
  encode::{RawComment, RawNotification, SEGMENT_SEPARATOR, encode_dt, encode_segment},
  schema::SCHEMA,
};

// ─── SQL ─────────────────────────────────────────────────────────────────────

const INSERT_ROOT: &str = "
  INSERT INTO comments (comment_id, path, content, pin_id, user_id)
  VALUES (?1, ?2, ?3, ?4, ?5)";

/// The parent lookup and the insert are one statement. A parent that is
/// missing, or that belongs to another pin, contributes an empty prefix,
/// leaving a single-segment path that is detected and removed before commit.
const INSERT_CHILD: &str = "
  INSERT INTO comments (comment_id, path, content, pin_id, user_id)
  VALUES (
    ?1,
    COALESCE(
      (SELECT path || '.' FROM comments WHERE comment_id = ?2 AND pin_id = ?5),
      ''
    ) || ?3,
    ?4, ?5, ?6
  )";

const DELETE_COMMENT: &str = "DELETE FROM comments WHERE comment_id = ?1";

const SELECT_COMMENT: &str = "
  SELECT c.comment_id, c.path, c.content, c.pin_id, c.user_id, u.username
  FROM comments c
  JOIN users u ON u.user_id = c.user_id
  WHERE c.comment_id = ?1";

const SELECT_THREAD: &str = "
  SELECT c.comment_id, c.path, c.content, c.pin_id, c.user_id, u.username
  FROM comments c
  JOIN users u ON u.user_id = c.user_id
  WHERE c.pin_id = ?1
  ORDER BY c.path";

const SELECT_NOTIFICATIONS: &str = "
  SELECT notification_id, to_user_id, note_type, data_json, created_at, is_read
  FROM notifications
  WHERE to_user_id = ?1
  ORDER BY notification_id DESC";

fn raw_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawComment> {
  Ok(RawComment {
    comment_id: row.get(0)?,
    path:       row.get(1)?,
    content:    row.get(2)?,
    pin_id:     row.get(3)?,
    user_id:    row.get(4)?,
    username:   row.get(5)?,
  })
}

/// Draw the next comment id inside `tx`.
///
/// The id is only meaningful to the transaction that drew it: the row that
/// depends on it must be written before `tx` commits. Ids are monotonic and
/// never handed out twice, even if the transaction rolls back after drawing.
fn reserve_comment_id(tx: &rusqlite::Transaction<'_>) -> rusqlite::Result<CommentId> {
  tx.execute("INSERT INTO comment_ids DEFAULT VALUES", [])?;
  let id = tx.last_insert_rowid();
  tx.execute("DELETE FROM comment_ids WHERE id = ?1", [id])?;
  Ok(id)
}

/// What one comment insert transaction ended with.
enum Inserted {
  Row(RawComment),
  /// The parent lookup came back empty; the row was deleted before commit.
  MissingParent {
    comment_id: CommentId,
    parent_id:  CommentId,
  },
  /// The delete of a parentless row failed and the transaction was dropped.
  CompensationFailed {
    comment_id: CommentId,
    parent_id:  CommentId,
    source:     rusqlite::Error,
  },
}

impl Inserted {
  fn into_comment(self) -> Result<Comment> {
    match self {
      Inserted::Row(raw) => raw.into_comment(),
      Inserted::MissingParent { comment_id, parent_id } => {
        tracing::warn!(comment_id, parent_id, "parent comment not found; reply discarded");
        Err(Error::ParentNotFound(parent_id))
      }
      Inserted::CompensationFailed { comment_id, parent_id, source } => {
        tracing::error!(
          comment_id,
          parent_id,
          error = %source,
          "could not remove reply to missing parent; insert rolled back"
        );
        Err(Error::CompensationFailed { comment_id, parent_id, source })
      }
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tack store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Collaborator rows ─────────────────────────────────────────────────────

  /// Insert a user row and return its id.
  pub async fn add_user(&self, username: impl Into<String>) -> Result<UserId> {
    let username = username.into();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (username) VALUES (?1)",
          rusqlite::params![username],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(id)
  }

  /// Insert a pin owned by `owner` and return its id.
  pub async fn add_pin(&self, owner: UserId, title: impl Into<String>) -> Result<PinId> {
    let title = title.into();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pins (user_id, title) VALUES (?1, ?2)",
          rusqlite::params![owner, title],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(id)
  }

  /// Record that `follower_id` follows `user_id`. Idempotent.
  pub async fn follow(&self, follower_id: UserId, user_id: UserId) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO follows (follower_id, user_id) VALUES (?1, ?2)",
          rusqlite::params![follower_id, user_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Comment internals ─────────────────────────────────────────────────────

  /// Draw an id and write the comment in one immediate transaction, then read
  /// it back joined with its author.
  ///
  /// A reply whose parent lookup came back empty is deleted again inside the
  /// same transaction, so readers never observe it.
  async fn insert_comment(
    &self,
    input: NewComment,
    parent_id: Option<CommentId>,
  ) -> Result<Inserted> {
    let NewComment { content, pin_id, author_id } = input;

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id = reserve_comment_id(&tx)?;
        let segment =
          encode_segment(id).map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

        match parent_id {
          None => tx.execute(
            INSERT_ROOT,
            rusqlite::params![id, segment, content, pin_id, author_id],
          )?,
          Some(parent) => tx.execute(
            INSERT_CHILD,
            rusqlite::params![id, parent, segment, content, pin_id, author_id],
          )?,
        };

        let raw = tx.query_row(SELECT_COMMENT, rusqlite::params![id], raw_comment)?;

        if let Some(parent_id) = parent_id
          && !raw.path.contains(SEGMENT_SEPARATOR)
        {
          // Dropping `tx` rolls the insert back.
          if let Err(source) = tx.execute(DELETE_COMMENT, rusqlite::params![id]) {
            return Ok(Inserted::CompensationFailed { comment_id: id, parent_id, source });
          }
          tx.commit()?;
          return Ok(Inserted::MissingParent { comment_id: id, parent_id });
        }

        tx.commit()?;
        Ok(Inserted::Row(raw))
      })
      .await?;

    Ok(inserted)
  }
}

// ─── CommentStore impl ───────────────────────────────────────────────────────

impl CommentStore for SqliteStore {
  type Error = Error;

  async fn create_root(&self, input: NewComment) -> Result<Comment> {
    let comment = self.insert_comment(input, None).await?.into_comment()?;
    tracing::debug!(comment_id = comment.id, pin_id = comment.pin_id, "created thread root");
    Ok(comment)
  }

  async fn create_child(&self, input: NewComment, parent_id: CommentId) -> Result<Comment> {
    let comment = self
      .insert_comment(input, Some(parent_id))
      .await?
      .into_comment()?;
    tracing::debug!(comment_id = comment.id, path = %comment.path, "created reply");
    Ok(comment)
  }

  async fn get_comment(&self, id: CommentId) -> Result<Comment> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(SELECT_COMMENT, rusqlite::params![id], raw_comment)
            .optional()?,
        )
      })
      .await?;

    raw.ok_or(Error::CommentNotFound(id))?.into_comment()
  }

  async fn get_thread(&self, pin_id: PinId) -> Result<Vec<Comment>> {
    let (pin_exists, raws) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raws = {
          let mut stmt = tx.prepare(SELECT_THREAD)?;
          stmt
            .query_map(rusqlite::params![pin_id], raw_comment)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        let pin_exists = !raws.is_empty()
          || tx.query_row(
            "SELECT EXISTS (SELECT 1 FROM pins WHERE pin_id = ?1)",
            rusqlite::params![pin_id],
            |row| row.get::<_, bool>(0),
          )?;
        tx.commit()?;
        Ok((pin_exists, raws))
      })
      .await?;

    if !pin_exists {
      return Err(Error::PinNotFound(pin_id));
    }

    raws.into_iter().map(RawComment::into_comment).collect()
  }
}

// ─── NotificationStore impl ──────────────────────────────────────────────────

impl NotificationStore for SqliteStore {
  type Error = Error;

  async fn pin_owner(&self, pin_id: PinId) -> Result<UserId> {
    let owner: Option<UserId> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id FROM pins WHERE pin_id = ?1",
              rusqlite::params![pin_id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    owner.ok_or(Error::PinNotFound(pin_id))
  }

  async fn followers(&self, user_id: UserId) -> Result<Vec<UserId>> {
    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT follower_id FROM follows WHERE user_id = ?1 ORDER BY follower_id",
        )?;
        let ids = stmt
          .query_map(rusqlite::params![user_id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<UserId>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  async fn store_notification(
    &self,
    to_user_id: UserId,
    event: &NoteEvent,
  ) -> Result<Notification> {
    let created_at = Utc::now();
    let note_type  = event.discriminant().to_owned();
    let data_json  = event.to_json()?.to_string();
    let at_str     = encode_dt(created_at);

    let notification_id: NotificationId = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (to_user_id, note_type, data_json, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![to_user_id, note_type, data_json, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Notification {
      notification_id,
      to_user_id,
      event: event.clone(),
      created_at,
      is_read: false,
    })
  }

  async fn notifications_for(&self, user_id: UserId) -> Result<Vec<Notification>> {
    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(SELECT_NOTIFICATIONS)?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], |row| {
            Ok(RawNotification {
              notification_id: row.get(0)?,
              to_user_id:      row.get(1)?,
              note_type:       row.get(2)?,
              data_json:       row.get(3)?,
              created_at:      row.get(4)?,
              is_read:         row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }

  async fn mark_read(&self, user_id: UserId, notification_id: NotificationId) -> Result<()> {
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notifications SET is_read = 1
           WHERE notification_id = ?1 AND to_user_id = ?2",
          rusqlite::params![notification_id, user_id],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::NotificationNotFound(notification_id));
    }
    Ok(())
  }

  async fn mark_all_read(&self, user_id: UserId) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE notifications SET is_read = 1 WHERE to_user_id = ?1",
          rusqlite::params![user_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
