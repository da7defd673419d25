//! SQL schema for the Tack SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Owned by the account collaborator; only the columns comments join on.
CREATE TABLE IF NOT EXISTS users (
    user_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    username  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS pins (
    pin_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id   INTEGER NOT NULL REFERENCES users(user_id),
    title     TEXT NOT NULL,
    img_link  TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS follows (
    follower_id INTEGER NOT NULL REFERENCES users(user_id),
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    PRIMARY KEY (follower_id, user_id),
    CHECK (follower_id != user_id)
);

-- Comment id sequence. Rows are removed right after they are drawn;
-- AUTOINCREMENT keeps ids monotonic and never reused regardless.
CREATE TABLE IF NOT EXISTS comment_ids (
    id INTEGER PRIMARY KEY AUTOINCREMENT
);

-- Comments are written once and never updated.
-- `path` is the sortable encoding of the root-to-self id chain.
CREATE TABLE IF NOT EXISTS comments (
    comment_id INTEGER PRIMARY KEY,
    path       TEXT NOT NULL UNIQUE,
    content    TEXT NOT NULL,
    pin_id     INTEGER NOT NULL REFERENCES pins(pin_id),
    user_id    INTEGER NOT NULL REFERENCES users(user_id)
);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id INTEGER PRIMARY KEY AUTOINCREMENT,
    to_user_id      INTEGER NOT NULL REFERENCES users(user_id),
    note_type       TEXT NOT NULL,    -- discriminant of NoteEvent variant
    data_json       TEXT NOT NULL,    -- JSON payload (inner data only)
    created_at      TEXT NOT NULL,    -- ISO 8601 UTC
    is_read         INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS comments_thread_idx   ON comments(pin_id, path);
CREATE INDEX IF NOT EXISTS follows_user_idx      ON follows(user_id);
CREATE INDEX IF NOT EXISTS notifications_to_idx  ON notifications(to_user_id);

PRAGMA user_version = 1;
";
