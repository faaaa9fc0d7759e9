//! Row to contract conversions. A reference resolves to full data when the
//! referenced row is present in the lookup map and to a bare id otherwise.
use std::collections::HashMap;

use crate::contract::{NoteBook, NoteRef, Share, UserRef};
use crate::infra::storage::entity::{note, note_book, share, user};

pub type Users = HashMap<i64, user::Model>;
pub type Notes = HashMap<i64, note::Model>;

impl From<user::Model> for UserRef {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            login: Some(m.login),
        }
    }
}

impl From<note::Model> for NoteRef {
    fn from(m: note::Model) -> Self {
        Self {
            id: m.id,
            title: Some(m.title),
            content: Some(m.content),
            date: Some(m.date),
        }
    }
}

fn user_ref(id: Option<i64>, users: &Users) -> Option<UserRef> {
    id.map(|id| match users.get(&id) {
        Some(m) => m.clone().into(),
        None => UserRef::lazy(id),
    })
}

fn note_ref(id: Option<i64>, notes: &Notes) -> Option<NoteRef> {
    id.map(|id| match notes.get(&id) {
        Some(m) => m.clone().into(),
        None => NoteRef::lazy(id),
    })
}

pub fn note_book_to_contract(m: note_book::Model, users: &Users) -> NoteBook {
    NoteBook {
        id: Some(m.id),
        name: Some(m.name),
        handle: Some(m.handle),
        user: user_ref(m.user_id, users),
    }
}

pub fn share_to_contract(m: share::Model, users: &Users, notes: &Notes) -> Share {
    Share {
        id: Some(m.id),
        invite: Some(m.invite),
        author: user_ref(m.author_id, users),
        with_user: user_ref(m.with_user_id, users),
        sharing: note_ref(m.sharing_id, notes),
    }
}
