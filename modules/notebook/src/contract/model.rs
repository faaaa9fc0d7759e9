//! Transport-agnostic models for the notebook module.
//!
//! Equality for [`NoteBook`] and [`Share`] is identity-based: two values are
//! equal when both carry the same non-null id. A value without an id is equal
//! only to itself.
use chrono::{DateTime, Utc};

/// Reference to a user account. `login` is only filled when the reference
/// was resolved eagerly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: i64,
    pub login: Option<String>,
}

impl UserRef {
    pub fn lazy(id: i64) -> Self {
        Self { id, login: None }
    }
}

/// Reference to a note. The payload fields are only filled when the
/// reference was resolved eagerly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRef {
    pub id: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl NoteRef {
    pub fn lazy(id: i64) -> Self {
        Self {
            id,
            title: None,
            content: None,
            date: None,
        }
    }
}

/// A named notebook with a short handle, optionally owned by a user.
#[derive(Debug, Clone, Default)]
pub struct NoteBook {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub handle: Option<String>,
    pub user: Option<UserRef>,
}

/// An invitation that shares a note from one user with another.
#[derive(Debug, Clone, Default)]
pub struct Share {
    pub id: Option<i64>,
    pub invite: Option<String>,
    pub author: Option<UserRef>,
    pub with_user: Option<UserRef>,
    pub sharing: Option<NoteRef>,
}

fn same_identity<T>(a: &T, a_id: Option<i64>, b: &T, b_id: Option<i64>) -> bool {
    match (a_id, b_id) {
        (Some(x), Some(y)) => x == y,
        _ => std::ptr::eq(a, b),
    }
}

impl PartialEq for NoteBook {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self, self.id, other, other.id)
    }
}

impl PartialEq for Share {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self, self.id, other, other.id)
    }
}
