use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::domain::entity::Entity;
use crate::domain::error::DomainError;
use crate::domain::repo::Repository;

/// Request handling for one entity type.
///
/// Guards run in a fixed order and the first failure wins: id presence,
/// path/payload id match, existence, field validation, persistence.
pub struct EntityService<E: Entity> {
    repo: Arc<dyn Repository<E>>,
}

impl<E: Entity> EntityService<E> {
    pub fn new(repo: Arc<dyn Repository<E>>) -> Self {
        Self { repo }
    }

    #[instrument(name = "notebook.service.create", skip_all, fields(entity = E::NAME))]
    pub async fn create(&self, entity: E) -> Result<E, DomainError> {
        if entity.id().is_some() {
            return Err(DomainError::id_exists(E::NAME));
        }
        entity
            .validate()
            .map_err(|v| DomainError::validation(E::NAME, v))?;

        let saved = self.repo.save(entity).await.map_err(db_error)?;
        info!(id = ?saved.id(), "created {}", E::NAME);
        Ok(saved)
    }

    #[instrument(name = "notebook.service.update", skip(self, entity), fields(entity = E::NAME))]
    pub async fn update(&self, id: i64, entity: E) -> Result<E, DomainError> {
        self.check_identity(id, &entity).await?;
        entity
            .validate()
            .map_err(|v| DomainError::validation(E::NAME, v))?;

        let saved = self.repo.save(entity).await.map_err(db_error)?;
        info!("replaced {} {}", E::NAME, id);
        Ok(saved)
    }

    #[instrument(name = "notebook.service.partial_update", skip(self, patch), fields(entity = E::NAME))]
    pub async fn partial_update(&self, id: i64, patch: E) -> Result<E, DomainError> {
        self.check_identity(id, &patch).await?;

        let mut current = self
            .repo
            .find_by_id(id)
            .await
            .map_err(db_error)?
            .ok_or_else(|| DomainError::id_not_found(E::NAME, id))?;
        current.merge(patch);
        current
            .validate()
            .map_err(|v| DomainError::validation(E::NAME, v))?;

        let saved = self.repo.save(current).await.map_err(db_error)?;
        info!("patched {} {}", E::NAME, id);
        Ok(saved)
    }

    #[instrument(name = "notebook.service.list", skip(self), fields(entity = E::NAME))]
    pub async fn list(&self, eager: bool) -> Result<Vec<E>, DomainError> {
        let items = if eager {
            self.repo.find_all_eager().await
        } else {
            self.repo.find_all().await
        }
        .map_err(db_error)?;
        debug!(count = items.len(), "listed {}", E::NAME);
        Ok(items)
    }

    #[instrument(name = "notebook.service.get", skip(self), fields(entity = E::NAME))]
    pub async fn get(&self, id: i64) -> Result<E, DomainError> {
        self.repo
            .find_by_id_eager(id)
            .await
            .map_err(db_error)?
            .ok_or_else(|| DomainError::not_found(E::NAME, id))
    }

    /// Deleting an absent id is a no-op.
    #[instrument(name = "notebook.service.delete", skip(self), fields(entity = E::NAME))]
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        if self.repo.delete(id).await.map_err(db_error)? {
            info!("deleted {} {}", E::NAME, id);
        } else {
            debug!("{} {} was already absent", E::NAME, id);
        }
        Ok(())
    }

    async fn check_identity(&self, path_id: i64, entity: &E) -> Result<(), DomainError> {
        let body_id = entity.id().ok_or_else(|| DomainError::id_null(E::NAME))?;
        if body_id != path_id {
            return Err(DomainError::id_invalid(E::NAME, path_id, body_id));
        }
        if !self.repo.exists(path_id).await.map_err(db_error)? {
            return Err(DomainError::id_not_found(E::NAME, path_id));
        }
        Ok(())
    }
}

fn db_error(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}
