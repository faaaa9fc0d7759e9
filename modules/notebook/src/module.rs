use std::sync::Arc;

use axum::Router;
use modkit::api::OpenApiRegistry;
use modkit_db::DbHandle;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::{error::Alerts, routes};
use crate::config::NotebookConfig;
use crate::contract::{NoteBook, Share};
use crate::domain::service::EntityService;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{SeaOrmNoteBookRepository, SeaOrmShareRepository};

/// Wired notebook module: one service per resource plus the alert header
/// settings.
#[derive(Clone)]
pub struct NotebookModule {
    notebooks: Arc<EntityService<NoteBook>>,
    shares: Arc<EntityService<Share>>,
    alerts: Alerts,
}

impl NotebookModule {
    /// Apply the module's schema migrations.
    pub async fn migrate(db: &DbHandle) -> anyhow::Result<()> {
        info!("Running notebook database migrations");
        Migrator::up(&db.sea(), None).await?;
        info!("Notebook database migrations completed successfully");
        Ok(())
    }

    pub fn new(conn: DatabaseConnection, cfg: NotebookConfig) -> anyhow::Result<Self> {
        debug!("Loaded notebook config: app_name={}", cfg.app_name);
        let alerts = Alerts::new(&cfg.app_name)?;

        let notebooks = EntityService::<NoteBook>::new(Arc::new(SeaOrmNoteBookRepository::new(
            conn.clone(),
        )));
        let shares = EntityService::<Share>::new(Arc::new(SeaOrmShareRepository::new(conn)));

        Ok(Self {
            notebooks: Arc::new(notebooks),
            shares: Arc::new(shares),
            alerts,
        })
    }

    pub fn notebooks(&self) -> &Arc<EntityService<NoteBook>> {
        &self.notebooks
    }

    pub fn shares(&self) -> &Arc<EntityService<Share>> {
        &self.shares
    }

    pub fn register_rest(
        &self,
        router: Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<Router> {
        info!("Registering notebook REST routes");
        let router = routes::register_routes(
            router,
            openapi,
            self.notebooks.clone(),
            self.shares.clone(),
            self.alerts.clone(),
        )?;
        info!("Notebook REST routes registered successfully");
        Ok(router)
    }
}
