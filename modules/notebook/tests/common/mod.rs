#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{TimeZone, Utc};
use modkit_db::{ConnectOpts, DbHandle};
use notebook::config::NotebookConfig;
use notebook::infra::storage::entity::{note, user};
use notebook::NotebookModule;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use serde_json::Value;
use tower::ServiceExt;

/// Minimal OpenAPI registry stub for tests. It records nothing.
pub struct MockOpenApiRegistry;

impl modkit::api::OpenApiRegistry for MockOpenApiRegistry {
    fn register_operation(&self, _spec: &modkit::api::OperationSpec) {}

    fn ensure_schema_raw(&self, root_name: &str, _schemas: modkit::api::SchemaCollection) -> String {
        root_name.to_string()
    }
}

pub struct TestApp {
    pub db: DatabaseConnection,
    pub module: NotebookModule,
    pub router: Router,
}

/// Fresh in-memory SQLite database with migrations applied.
pub async fn create_test_db() -> DbHandle {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("Failed to connect to test database");
    NotebookModule::migrate(&db)
        .await
        .expect("Failed to run migrations");
    db
}

/// Module routes nested under `/api`, the way the ingress mounts them.
pub async fn create_test_app() -> TestApp {
    let handle = create_test_db().await;
    let db = handle.sea();
    let module =
        NotebookModule::new(db.clone(), NotebookConfig::default()).expect("module wiring failed");
    let routes = module
        .register_rest(Router::new(), &MockOpenApiRegistry)
        .expect("Failed to register routes");
    TestApp {
        db,
        module,
        router: Router::new().nest("/api", routes),
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.expect("router failed")
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (Response<Body>, Value) {
        let req = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();
        let resp = self.send(req).await;
        split(resp).await
    }

    pub async fn insert_user(&self, login: &str) -> i64 {
        user::ActiveModel {
            login: Set(login.to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
        .id
    }

    pub async fn insert_note(&self, title: &str) -> i64 {
        note::ActiveModel {
            title: Set(title.to_string()),
            content: Set(format!("{title} body")),
            date: Set(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            user_id: Set(None),
            notebook_id: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
        .id
    }

    pub async fn count<E: EntityTrait>(&self, _entity: E) -> u64
    where
        E::Model: Sync,
    {
        E::find().count(&self.db).await.unwrap()
    }
}

/// Split a response into itself (headers and status kept) and its JSON body.
pub async fn split(resp: Response<Body>) -> (Response<Body>, Value) {
    let (parts, body) = resp.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (Response::from_parts(parts, Body::empty()), value)
}

pub fn header<'a>(resp: &'a Response<Body>, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}
