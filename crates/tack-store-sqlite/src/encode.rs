//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings. Notification payloads are compact JSON.
//! Comment paths are fixed-width hex segments joined by `.`, so SQLite's
//! default `BINARY` collation orders them like [`CommentPath`].

use chrono::{DateTime, Utc};
use tack_core::{
  comment::{Comment, CommentId, CommentPath},
  notification::{NoteEvent, Notification},
};

use crate::{Error, Result};

// ─── CommentPath ─────────────────────────────────────────────────────────────

/// Width of one hex-encoded path segment; enough for any non-negative `i64`.
const SEGMENT_WIDTH: usize = 16;

pub const SEGMENT_SEPARATOR: char = '.';

/// One path segment: the id as fixed-width lowercase hex. Negative ids have
/// no sortable encoding and are refused.
pub fn encode_segment(id: CommentId) -> Result<String, tack_core::Error> {
  let raw = u64::try_from(id).map_err(|_| tack_core::Error::NegativeId(id))?;
  Ok(format!("{raw:0width$x}", width = SEGMENT_WIDTH))
}

/// Encode a path so that SQLite's default `BINARY` collation orders encoded
/// paths exactly like [`CommentPath`]'s `Ord`.
///
/// Segments are fixed-width, so the first differing segment decides the
/// comparison before any separator is reached, and a path that is a prefix of
/// another is also a byte prefix of it and sorts first.
#[cfg(test)]
pub fn encode_path(path: &CommentPath) -> Result<String, tack_core::Error> {
  let mut out = String::with_capacity(path.depth() * (SEGMENT_WIDTH + 1));
  for (i, &id) in path.as_slice().iter().enumerate() {
    if i > 0 {
      out.push(SEGMENT_SEPARATOR);
    }
    out.push_str(&encode_segment(id)?);
  }
  Ok(out)
}

pub fn decode_path(s: &str) -> Result<CommentPath> {
  let ids = s
    .split(SEGMENT_SEPARATOR)
    .map(decode_segment)
    .collect::<Result<Vec<_>>>()?;
  Ok(CommentPath::try_from(ids)?)
}

fn decode_segment(seg: &str) -> Result<CommentId> {
  let malformed = || tack_core::Error::MalformedPath(seg.to_owned());
  if seg.len() != SEGMENT_WIDTH {
    return Err(malformed().into());
  }
  let raw = u64::from_str_radix(seg, 16).map_err(|_| malformed())?;
  Ok(CommentId::try_from(raw).map_err(|_| malformed())?)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `comments` row joined with its author.
pub struct RawComment {
  pub comment_id: i64,
  pub path:       String,
  pub content:    String,
  pub pin_id:     i64,
  pub user_id:    i64,
  pub username:   String,
}

impl RawComment {
  pub fn into_comment(self) -> Result<Comment> {
    let path = decode_path(&self.path)?;
    if path.id() != self.comment_id {
      return Err(tack_core::Error::MalformedPath(self.path).into());
    }

    Ok(Comment {
      id: self.comment_id,
      path,
      content: self.content,
      pin_id: self.pin_id,
      author_id: self.user_id,
      author_name: self.username,
    })
  }
}

/// Raw values read from a `notifications` row.
pub struct RawNotification {
  pub notification_id: i64,
  pub to_user_id:      i64,
  pub note_type:       String,
  pub data_json:       String,
  pub created_at:      String,
  pub is_read:         bool,
}

impl RawNotification {
  pub fn into_notification(self) -> Result<Notification> {
    let data: serde_json::Value = serde_json::from_str(&self.data_json)?;

    Ok(Notification {
      notification_id: self.notification_id,
      to_user_id:      self.to_user_id,
      event:           NoteEvent::from_parts(&self.note_type, data)?,
      created_at:      decode_dt(&self.created_at)?,
      is_read:         self.is_read,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn segments_are_fixed_width() {
    assert_eq!(encode_segment(10).unwrap(), "000000000000000a");
    assert_eq!(encode_segment(CommentId::MAX).unwrap(), "7fffffffffffffff");

    let path = CommentPath::try_from(vec![1, 255]).unwrap();
    assert_eq!(encode_path(&path).unwrap(), "0000000000000001.00000000000000ff");
    assert_eq!(decode_path("0000000000000001.00000000000000ff").unwrap(), path);
  }

  #[test]
  fn byte_order_matches_path_order() {
    // Pairs chosen so that a naive decimal encoding would misorder them.
    let paths: Vec<CommentPath> = [
      vec![9],
      vec![9, 10],
      vec![9, 10, 2],
      vec![9, 100],
      vec![10],
      vec![10, 9],
      vec![255, 256],
      vec![256],
    ]
    .into_iter()
    .map(|ids| CommentPath::try_from(ids).unwrap())
    .collect();

    for a in &paths {
      for b in &paths {
        assert_eq!(
          encode_path(a).unwrap().cmp(&encode_path(b).unwrap()),
          a.cmp(b),
          "{a} vs {b}"
        );
      }
    }
  }

  #[test]
  fn negative_ids_are_not_encoded() {
    assert!(matches!(
      encode_segment(-1),
      Err(tack_core::Error::NegativeId(-1))
    ));
    let path = CommentPath::try_from(vec![4, -2]).unwrap();
    assert!(encode_path(&path).is_err());
  }

  #[test]
  fn malformed_paths_are_rejected() {
    assert!(decode_path("").is_err());
    assert!(decode_path("abc").is_err());
    assert!(decode_path("000000000000000g").is_err());
    assert!(decode_path("0000000000000001..0000000000000002").is_err());
    assert!(decode_path("ffffffffffffffff").is_err());
  }
}
