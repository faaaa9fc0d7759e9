//! SeaORM-backed repositories for the domain port.
//!
//! Both repositories are generic over `C: ConnectionTrait`, so they can be
//! built with a `DatabaseConnection` or a transaction. Eager loads issue one
//! batched `IN (...)` query per referenced table for the whole result set.

use std::collections::BTreeSet;

use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::contract::{NoteBook, Share};
use crate::domain::repo::Repository;
use crate::infra::storage::entity::{note, note_book, share, user};
use crate::infra::storage::mapper::{self, Notes, Users};

async fn load_users<C>(conn: &C, ids: BTreeSet<i64>) -> anyhow::Result<Users>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Users::new());
    }
    let rows = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(conn)
        .await
        .context("load users failed")?;
    Ok(rows.into_iter().map(|m| (m.id, m)).collect())
}

async fn load_notes<C>(conn: &C, ids: BTreeSet<i64>) -> anyhow::Result<Notes>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Notes::new());
    }
    let rows = note::Entity::find()
        .filter(note::Column::Id.is_in(ids))
        .all(conn)
        .await
        .context("load notes failed")?;
    Ok(rows.into_iter().map(|m| (m.id, m)).collect())
}

fn primary_key(id: Option<i64>) -> sea_orm::ActiveValue<i64> {
    match id {
        Some(id) => Set(id),
        None => NotSet,
    }
}

/// NoteBook repository.
pub struct SeaOrmNoteBookRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmNoteBookRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    async fn resolve(&self, rows: Vec<note_book::Model>) -> anyhow::Result<Vec<NoteBook>> {
        let users = load_users(&self.conn, rows.iter().filter_map(|r| r.user_id).collect()).await?;
        Ok(rows
            .into_iter()
            .map(|r| mapper::note_book_to_contract(r, &users))
            .collect())
    }
}

#[async_trait::async_trait]
impl<C> Repository<NoteBook> for SeaOrmNoteBookRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn exists(&self, id: i64) -> anyhow::Result<bool> {
        let count = note_book::Entity::find_by_id(id)
            .count(&self.conn)
            .await
            .context("exists failed")?;
        Ok(count > 0)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<NoteBook>> {
        let found = note_book::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(|m| mapper::note_book_to_contract(m, &Users::new())))
    }

    async fn find_by_id_eager(&self, id: i64) -> anyhow::Result<Option<NoteBook>> {
        let found = note_book::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id_eager failed")?;
        Ok(self.resolve(found.into_iter().collect()).await?.pop())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<NoteBook>> {
        let rows = note_book::Entity::find()
            .order_by_asc(note_book::Column::Id)
            .all(&self.conn)
            .await
            .context("find_all failed")?;
        Ok(rows
            .into_iter()
            .map(|m| mapper::note_book_to_contract(m, &Users::new()))
            .collect())
    }

    async fn find_all_eager(&self) -> anyhow::Result<Vec<NoteBook>> {
        let rows = note_book::Entity::find()
            .order_by_asc(note_book::Column::Id)
            .all(&self.conn)
            .await
            .context("find_all_eager failed")?;
        self.resolve(rows).await
    }

    async fn save(&self, nb: NoteBook) -> anyhow::Result<NoteBook> {
        let m = note_book::ActiveModel {
            id: primary_key(nb.id),
            name: Set(nb.name.context("noteBook name is required")?),
            handle: Set(nb.handle.context("noteBook handle is required")?),
            user_id: Set(nb.user.map(|u| u.id)),
        };
        let stored = if nb.id.is_some() {
            m.update(&self.conn).await.context("update failed")?
        } else {
            m.insert(&self.conn).await.context("insert failed")?
        };
        Ok(mapper::note_book_to_contract(stored, &Users::new()))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let res = note_book::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}

/// Share repository.
pub struct SeaOrmShareRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmShareRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    async fn resolve(&self, rows: Vec<share::Model>) -> anyhow::Result<Vec<Share>> {
        let user_ids = rows
            .iter()
            .flat_map(|r| [r.author_id, r.with_user_id])
            .flatten()
            .collect();
        let users = load_users(&self.conn, user_ids).await?;
        let notes = load_notes(&self.conn, rows.iter().filter_map(|r| r.sharing_id).collect()).await?;
        Ok(rows
            .into_iter()
            .map(|r| mapper::share_to_contract(r, &users, &notes))
            .collect())
    }
}

fn lazy_share(m: share::Model) -> Share {
    mapper::share_to_contract(m, &Users::new(), &Notes::new())
}

#[async_trait::async_trait]
impl<C> Repository<Share> for SeaOrmShareRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn exists(&self, id: i64) -> anyhow::Result<bool> {
        let count = share::Entity::find_by_id(id)
            .count(&self.conn)
            .await
            .context("exists failed")?;
        Ok(count > 0)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Share>> {
        let found = share::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(lazy_share))
    }

    async fn find_by_id_eager(&self, id: i64) -> anyhow::Result<Option<Share>> {
        let found = share::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id_eager failed")?;
        Ok(self.resolve(found.into_iter().collect()).await?.pop())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Share>> {
        let rows = share::Entity::find()
            .order_by_asc(share::Column::Id)
            .all(&self.conn)
            .await
            .context("find_all failed")?;
        Ok(rows.into_iter().map(lazy_share).collect())
    }

    async fn find_all_eager(&self) -> anyhow::Result<Vec<Share>> {
        let rows = share::Entity::find()
            .order_by_asc(share::Column::Id)
            .all(&self.conn)
            .await
            .context("find_all_eager failed")?;
        self.resolve(rows).await
    }

    async fn save(&self, s: Share) -> anyhow::Result<Share> {
        let m = share::ActiveModel {
            id: primary_key(s.id),
            invite: Set(s.invite.context("share invite is required")?),
            author_id: Set(s.author.map(|u| u.id)),
            with_user_id: Set(s.with_user.map(|u| u.id)),
            sharing_id: Set(s.sharing.map(|n| n.id)),
        };
        let stored = if s.id.is_some() {
            m.update(&self.conn).await.context("update failed")?
        } else {
            m.insert(&self.conn).await.context("insert failed")?
        };
        Ok(lazy_share(stored))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let res = share::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}
