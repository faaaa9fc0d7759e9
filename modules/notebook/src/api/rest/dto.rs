use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::{NoteBook, NoteRef, Share, UserRef};

/// Reference to a user. `login` is present only when resolved eagerly.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRefDto {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
}

/// Reference to a note. Payload fields are present only when resolved eagerly.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteRefDto {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

/// NoteBook representation used for both requests and responses.
///
/// On create `id` must be absent; on update it must match the path id. In a
/// partial update null or absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteBookDto {
    pub id: Option<i64>,
    /// At least 3 characters.
    pub name: Option<String>,
    /// At least 2 characters.
    pub handle: Option<String>,
    pub user: Option<UserRefDto>,
}

/// Share representation used for both requests and responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareDto {
    pub id: Option<i64>,
    /// Required, may be empty.
    pub invite: Option<String>,
    pub author: Option<UserRefDto>,
    pub with_user: Option<UserRefDto>,
    pub sharing: Option<NoteRefDto>,
}

/// Query parameters of the list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Resolve references to the full referenced rows.
    #[serde(default)]
    pub eagerload: bool,
}

impl From<UserRef> for UserRefDto {
    fn from(u: UserRef) -> Self {
        Self {
            id: u.id,
            login: u.login,
        }
    }
}

impl From<UserRefDto> for UserRef {
    /// Only the id of an incoming reference matters.
    fn from(u: UserRefDto) -> Self {
        UserRef::lazy(u.id)
    }
}

impl From<NoteRef> for NoteRefDto {
    fn from(n: NoteRef) -> Self {
        Self {
            id: n.id,
            title: n.title,
            content: n.content,
            date: n.date,
        }
    }
}

impl From<NoteRefDto> for NoteRef {
    fn from(n: NoteRefDto) -> Self {
        NoteRef::lazy(n.id)
    }
}

impl From<NoteBook> for NoteBookDto {
    fn from(nb: NoteBook) -> Self {
        Self {
            id: nb.id,
            name: nb.name,
            handle: nb.handle,
            user: nb.user.map(Into::into),
        }
    }
}

impl From<NoteBookDto> for NoteBook {
    fn from(dto: NoteBookDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            handle: dto.handle,
            user: dto.user.map(Into::into),
        }
    }
}

impl From<Share> for ShareDto {
    fn from(s: Share) -> Self {
        Self {
            id: s.id,
            invite: s.invite,
            author: s.author.map(Into::into),
            with_user: s.with_user.map(Into::into),
            sharing: s.sharing.map(Into::into),
        }
    }
}

impl From<ShareDto> for Share {
    fn from(dto: ShareDto) -> Self {
        Self {
            id: dto.id,
            invite: dto.invite,
            author: dto.author.map(Into::into),
            with_user: dto.with_user.map(Into::into),
            sharing: dto.sharing.map(Into::into),
        }
    }
}
