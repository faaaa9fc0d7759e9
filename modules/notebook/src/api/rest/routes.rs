use std::sync::Arc;

use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};

use crate::api::rest::error::Alerts;
use crate::api::rest::handlers::{self, Resource};
use crate::contract::{NoteBook, Share};
use crate::domain::service::EntityService;

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    notebooks: Arc<EntityService<NoteBook>>,
    shares: Arc<EntityService<Share>>,
    alerts: Alerts,
) -> anyhow::Result<Router> {
    router = register_resource::<NoteBook>(router, openapi, "note-books");
    router = register_resource::<Share>(router, openapi, "shares");

    router = router
        .layer(Extension(notebooks))
        .layer(Extension(shares))
        .layer(Extension(alerts));

    Ok(router)
}

/// Six operations per resource: create, replace, merge-patch, list, get, delete.
fn register_resource<E: Resource>(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    tag: &str,
) -> Router {
    let collection = format!("/{}", E::PATH);
    let item = format!("/{}/{{id}}", E::PATH);
    let name = E::NAME;

    // POST /{resource}
    router = OperationBuilder::<Missing, Missing, ()>::post(&collection)
        .operation_id(format!("notebook.{name}.create"))
        .summary(format!("Create a {name}"))
        .description("The payload must not carry an id; the server assigns one.")
        .tag(tag)
        .json_request::<E::Dto>(openapi, format!("{name} to create"))
        .handler(handlers::create::<E>)
        .json_response_with_schema::<E::Dto>(openapi, 201, format!("Created {name}"))
        .standard_errors(openapi)
        .register(router, openapi);

    // PUT /{resource}/{id}
    router = OperationBuilder::<Missing, Missing, ()>::put(&item)
        .operation_id(format!("notebook.{name}.update"))
        .summary(format!("Replace a {name}"))
        .description("Overwrites every field. The payload id must match the path id.")
        .tag(tag)
        .path_param("id", format!("{name} id"), "integer")
        .json_request::<E::Dto>(openapi, format!("Full {name}"))
        .handler(handlers::update::<E>)
        .json_response_with_schema::<E::Dto>(openapi, 200, format!("Updated {name}"))
        .standard_errors(openapi)
        .register(router, openapi);

    // PATCH /{resource}/{id}
    router = OperationBuilder::<Missing, Missing, ()>::patch(&item)
        .operation_id(format!("notebook.{name}.partial_update"))
        .summary(format!("Partially update a {name}"))
        .description(
            "Non-null fields overwrite the stored ones, null or absent fields are kept. \
             Accepts application/json and application/merge-patch+json.",
        )
        .tag(tag)
        .path_param("id", format!("{name} id"), "integer")
        .merge_patch_request::<E::Dto>(openapi, format!("Partial {name} with id"))
        .handler(handlers::partial_update::<E>)
        .json_response_with_schema::<E::Dto>(openapi, 200, format!("Merged {name}"))
        .standard_errors(openapi)
        .register(router, openapi);

    // GET /{resource}
    router = OperationBuilder::<Missing, Missing, ()>::get(&collection)
        .operation_id(format!("notebook.{name}.list"))
        .summary(format!("List every {name}"))
        .tag(tag)
        .query_param(
            "eagerload",
            false,
            "Resolve references to the referenced rows (default false)",
            "boolean",
        )
        .handler(handlers::list::<E>)
        .json_list_response::<E::Dto>(openapi, 200, format!("All {name} entries ordered by id"))
        .standard_errors(openapi)
        .register(router, openapi);

    // GET /{resource}/{id}
    router = OperationBuilder::<Missing, Missing, ()>::get(&item)
        .operation_id(format!("notebook.{name}.get"))
        .summary(format!("Get a {name} by id"))
        .tag(tag)
        .path_param("id", format!("{name} id"), "integer")
        .handler(handlers::get::<E>)
        .json_response_with_schema::<E::Dto>(openapi, 200, format!("{name} with resolved references"))
        .problem_response(openapi, 404, "Not Found")
        .standard_errors(openapi)
        .register(router, openapi);

    // DELETE /{resource}/{id}
    router = OperationBuilder::<Missing, Missing, ()>::delete(&item)
        .operation_id(format!("notebook.{name}.delete"))
        .summary(format!("Delete a {name}"))
        .description("Deleting an id that does not exist also answers 204.")
        .tag(tag)
        .path_param("id", format!("{name} id"), "integer")
        .handler(handlers::delete::<E>)
        .empty_response(204, format!("{name} deleted"))
        .standard_errors(openapi)
        .register(router, openapi);

    router
}
