//! Comment types: the rows of a pin's threaded discussion.
//!
//! A comment never changes after it is written. Its position in the reply tree
//! is captured once, at creation, as a materialised path: the ids of every
//! ancestor from the thread root down to the comment itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub type CommentId = i64;
pub type PinId = i64;
pub type UserId = i64;

// ─── CommentPath ─────────────────────────────────────────────────────────────

/// The root-to-self chain of comment ids.
///
/// Never empty. The derived `Ord` compares element-wise from the root and puts
/// a strict prefix before its extensions, so sorting a thread by path yields a
/// depth-first pre-order with siblings in id (creation) order and every
/// subtree contiguous.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<CommentId>", into = "Vec<CommentId>")]
pub struct CommentPath(Vec<CommentId>);

impl CommentPath {
  /// Path of a thread root.
  pub fn root(id: CommentId) -> Self { Self(vec![id]) }

  /// Path of a new reply `id` under `parent`.
  pub fn child(parent: &CommentPath, id: CommentId) -> Self {
    let mut ids = Vec::with_capacity(parent.0.len() + 1);
    ids.extend_from_slice(&parent.0);
    ids.push(id);
    Self(ids)
  }

  /// The id of the comment this path belongs to.
  pub fn id(&self) -> CommentId { self.0[self.0.len() - 1] }

  pub fn root_id(&self) -> CommentId { self.0[0] }

  /// The direct parent's id, or `None` for a thread root.
  pub fn parent_id(&self) -> Option<CommentId> {
    self.0.len().checked_sub(2).map(|i| self.0[i])
  }

  /// The direct parent's path, or `None` for a thread root.
  pub fn parent(&self) -> Option<CommentPath> {
    (!self.is_root()).then(|| Self(self.0[..self.0.len() - 1].to_vec()))
  }

  /// Number of ids in the path; a root has depth 1.
  pub fn depth(&self) -> usize { self.0.len() }

  pub fn is_root(&self) -> bool { self.0.len() == 1 }

  /// True when `self` is a strict ancestor of `other`.
  pub fn is_ancestor_of(&self, other: &CommentPath) -> bool {
    self.0.len() < other.0.len() && other.0.starts_with(&self.0)
  }

  pub fn as_slice(&self) -> &[CommentId] { &self.0 }
}

impl TryFrom<Vec<CommentId>> for CommentPath {
  type Error = Error;

  fn try_from(ids: Vec<CommentId>) -> Result<Self> {
    if ids.is_empty() {
      return Err(Error::EmptyPath);
    }
    Ok(Self(ids))
  }
}

impl From<CommentPath> for Vec<CommentId> {
  fn from(path: CommentPath) -> Self { path.0 }
}

impl fmt::Display for CommentPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, id) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("/")?;
      }
      write!(f, "{id}")?;
    }
    Ok(())
  }
}

// ─── Comment ─────────────────────────────────────────────────────────────────

/// A stored comment, as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub id:          CommentId,
  pub path:        CommentPath,
  pub content:     String,
  pub pin_id:      PinId,
  pub author_id:   UserId,
  /// Joined from the author's user row at read time.
  pub author_name: String,
}

impl Comment {
  pub fn is_root(&self) -> bool { self.path.is_root() }

  pub fn parent_id(&self) -> Option<CommentId> { self.path.parent_id() }

  pub fn depth(&self) -> usize { self.path.depth() }
}

// ─── NewComment ──────────────────────────────────────────────────────────────

/// Input to the comment-creating store operations. The id and path are always
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewComment {
  pub content:   String,
  pub pin_id:    PinId,
  pub author_id: UserId,
}

impl NewComment {
  pub fn new(content: impl Into<String>, pin_id: PinId, author_id: UserId) -> Self {
    Self { content: content.into(), pin_id, author_id }
  }
}
