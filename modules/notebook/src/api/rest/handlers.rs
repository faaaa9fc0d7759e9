//! Generic REST handlers, instantiated once per resource.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Extension, Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::api::rest::dto::{ListQuery, NoteBookDto, ShareDto};
use crate::api::rest::error::{map_domain_error, Alerts, RequestMeta, RestError};
use crate::contract::{NoteBook, Share};
use crate::domain::entity::Entity;
use crate::domain::service::EntityService;

/// An entity exposed over REST under `/{PATH}`.
pub trait Resource: Entity {
    /// Collection path segment, e.g. `note-books`.
    const PATH: &'static str;

    type Dto: Serialize
        + DeserializeOwned
        + utoipa::ToSchema
        + From<Self>
        + Into<Self>
        + Send
        + 'static;
}

impl Resource for NoteBook {
    const PATH: &'static str = "note-books";
    type Dto = NoteBookDto;
}

impl Resource for Share {
    const PATH: &'static str = "shares";
    type Dto = ShareDto;
}

type Svc<E> = Extension<Arc<EntityService<E>>>;

fn body<T>(payload: Result<Json<T>, JsonRejection>, meta: &RequestMeta) -> Result<T, RestError> {
    payload.map(|Json(v)| v).map_err(|rej| {
        warn!(path = %meta.path, "rejected request body: {}", rej.body_text());
        RestError::bad_request(rej.body_text(), meta)
    })
}

fn path_id(id: Result<Path<i64>, PathRejection>, meta: &RequestMeta) -> Result<i64, RestError> {
    id.map(|Path(id)| id)
        .map_err(|rej| RestError::bad_request(rej.body_text(), meta))
}

/// Create an entity; the payload must not carry an id.
pub async fn create<E: Resource>(
    Extension(svc): Svc<E>,
    Extension(alerts): Extension<Alerts>,
    meta: RequestMeta,
    payload: Result<Json<E::Dto>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<E::Dto>), RestError> {
    let entity: E = body(payload, &meta)?.into();
    info!("REST request to create {}", E::NAME);

    let created = svc
        .create(entity)
        .await
        .map_err(|e| map_domain_error(&e, &meta, &alerts))?;

    let id = created.id();
    let mut headers = alerts.entity_alert(E::NAME, "created", id);
    if let Some(id) = id {
        let location = format!("{}/{}", meta.path.trim_end_matches('/'), id);
        if let Ok(v) = HeaderValue::try_from(location) {
            headers.insert(header::LOCATION, v);
        }
    }
    Ok((StatusCode::CREATED, headers, Json(E::Dto::from(created))))
}

/// Replace the whole stored entity.
pub async fn update<E: Resource>(
    Extension(svc): Svc<E>,
    Extension(alerts): Extension<Alerts>,
    meta: RequestMeta,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<E::Dto>, JsonRejection>,
) -> Result<(HeaderMap, Json<E::Dto>), RestError> {
    let id = path_id(id, &meta)?;
    let entity: E = body(payload, &meta)?.into();
    info!("REST request to update {} {}", E::NAME, id);

    let updated = svc
        .update(id, entity)
        .await
        .map_err(|e| map_domain_error(&e, &meta, &alerts))?;
    let headers = alerts.entity_alert(E::NAME, "updated", Some(id));
    Ok((headers, Json(E::Dto::from(updated))))
}

/// Merge the non-null payload fields into the stored entity.
pub async fn partial_update<E: Resource>(
    Extension(svc): Svc<E>,
    Extension(alerts): Extension<Alerts>,
    meta: RequestMeta,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<E::Dto>, JsonRejection>,
) -> Result<(HeaderMap, Json<E::Dto>), RestError> {
    let id = path_id(id, &meta)?;
    let patch: E = body(payload, &meta)?.into();
    info!("REST request to partially update {} {}", E::NAME, id);

    let updated = svc
        .partial_update(id, patch)
        .await
        .map_err(|e| map_domain_error(&e, &meta, &alerts))?;
    let headers = alerts.entity_alert(E::NAME, "updated", Some(id));
    Ok((headers, Json(E::Dto::from(updated))))
}

pub async fn list<E: Resource>(
    Extension(svc): Svc<E>,
    Extension(alerts): Extension<Alerts>,
    meta: RequestMeta,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<E::Dto>>, RestError> {
    let Query(query) = query.map_err(|rej| RestError::bad_request(rej.body_text(), &meta))?;
    debug!(eager = query.eagerload, "REST request to list {}", E::NAME);

    let items = svc
        .list(query.eagerload)
        .await
        .map_err(|e| map_domain_error(&e, &meta, &alerts))?;
    Ok(Json(items.into_iter().map(E::Dto::from).collect()))
}

/// Fetch one entity with its references resolved.
pub async fn get<E: Resource>(
    Extension(svc): Svc<E>,
    Extension(alerts): Extension<Alerts>,
    meta: RequestMeta,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<E::Dto>, RestError> {
    let id = path_id(id, &meta)?;
    debug!("REST request to get {} {}", E::NAME, id);

    let entity = svc
        .get(id)
        .await
        .map_err(|e| map_domain_error(&e, &meta, &alerts))?;
    Ok(Json(E::Dto::from(entity)))
}

pub async fn delete<E: Resource>(
    Extension(svc): Svc<E>,
    Extension(alerts): Extension<Alerts>,
    meta: RequestMeta,
    id: Result<Path<i64>, PathRejection>,
) -> Result<(StatusCode, HeaderMap), RestError> {
    let id = path_id(id, &meta)?;
    info!("REST request to delete {} {}", E::NAME, id);

    svc.delete(id)
        .await
        .map_err(|e| map_domain_error(&e, &meta, &alerts))?;
    let headers = alerts.entity_alert(E::NAME, "deleted", Some(id));
    Ok((StatusCode::NO_CONTENT, headers))
}
