use async_trait::async_trait;

use crate::domain::entity::Entity;

/// Port for the persistence of one entity type.
///
/// Lazy lookups return references carrying ids only; the `_eager` variants
/// resolve them to the referenced rows. Lists are ordered by id ascending.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn exists(&self, id: i64) -> anyhow::Result<bool>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<E>>;

    async fn find_by_id_eager(&self, id: i64) -> anyhow::Result<Option<E>>;

    async fn find_all(&self) -> anyhow::Result<Vec<E>>;

    async fn find_all_eager(&self) -> anyhow::Result<Vec<E>>;

    /// Insert when the id is absent, otherwise overwrite the stored row.
    async fn save(&self, entity: E) -> anyhow::Result<E>;

    /// Returns true if a row was removed.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}
