//! Type-safe API operation builder
//!
//! A type-state builder ensures that:
//! - `register()` cannot be called unless a handler is set
//! - `register()` cannot be called unless at least one response is declared
//!
//! Everything declared on the builder ends up in an [`OperationSpec`] handed to
//! the [`OpenApiRegistry`], so a route and its documentation never drift apart.

use axum::{handler::Handler, routing::MethodRouter, Router};
use http::Method;
use std::marker::PhantomData;

use crate::api::problem;

/// Component schemas collected for one type, root first.
pub type SchemaCollection = Vec<(
    String,
    utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>,
)>;

/// Type-state markers for compile-time enforcement
pub mod state {
    #[derive(Debug, Clone, Copy)]
    pub struct Missing;

    #[derive(Debug, Clone, Copy)]
    pub struct Present;
}

pub use state::{Missing, Present};

mod sealed {
    pub trait Sealed {}
}

/// Maps handler state to the router slot type: nothing for `Missing`,
/// a `MethodRouter<S>` for `Present`.
pub trait HandlerSlot<S>: sealed::Sealed {
    type Slot;
}

impl sealed::Sealed for Missing {}
impl sealed::Sealed for Present {}

impl<S> HandlerSlot<S> for Missing {
    type Slot = ();
}
impl<S> HandlerSlot<S> for Present {
    type Slot = MethodRouter<S>;
}

#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub description: Option<String>,
    /// JSON Schema type (string, integer, boolean, ...)
    pub param_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
}

impl ParamLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
        }
    }
}

#[derive(Clone, Debug)]
pub struct RequestBodySpec {
    pub content_type: &'static str,
    pub description: Option<String>,
    /// Registered component schema referenced via `$ref`.
    pub schema_name: Option<String>,
    pub required: bool,
}

#[derive(Clone, Debug)]
pub struct ResponseSpec {
    pub status: u16,
    /// `None` for responses without a body (e.g. 204).
    pub content_type: Option<&'static str>,
    pub description: String,
    pub schema_name: Option<String>,
    /// Item schema when the body is a JSON array of `schema_name`.
    pub is_array: bool,
}

#[derive(Clone, Debug)]
pub struct OperationSpec {
    pub method: Method,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub params: Vec<ParamSpec>,
    pub request_body: Option<RequestBodySpec>,
    pub responses: Vec<ResponseSpec>,
}

/// Registry for OpenAPI operations and schemas
pub trait OpenApiRegistry: Send + Sync {
    fn register_operation(&self, spec: &OperationSpec);

    /// Ensure the collected schemas are present under components and return the
    /// canonical component name for `$ref`.
    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String;
}

/// Register `T` (and everything it references) with the registry.
pub fn ensure_schema<T: utoipa::ToSchema + utoipa::PartialSchema + 'static>(
    registry: &dyn OpenApiRegistry,
) -> String {
    use utoipa::PartialSchema;

    let root_name = T::name().to_string();
    // T's own schema goes first so the component is an object, not a self-ref.
    let mut collected: SchemaCollection = vec![(root_name.clone(), <T as PartialSchema>::schema())];
    T::schemas(&mut collected);
    registry.ensure_schema_raw(&root_name, collected)
}

/// Generic parameters:
/// - `H`: handler state (Missing | Present)
/// - `R`: response state (Missing | Present)
/// - `S`: router state type
pub struct OperationBuilder<H, R, S>
where
    H: HandlerSlot<S>,
{
    spec: OperationSpec,
    method_router: <H as HandlerSlot<S>>::Slot,
    _has_handler: PhantomData<H>,
    _has_response: PhantomData<R>,
    #[allow(clippy::type_complexity)]
    _state: PhantomData<fn() -> S>,
}

impl<S> OperationBuilder<Missing, Missing, S> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            spec: OperationSpec {
                method,
                path: path.into(),
                operation_id: None,
                summary: None,
                description: None,
                tags: Vec::new(),
                params: Vec::new(),
                request_body: None,
                responses: Vec::new(),
            },
            method_router: (),
            _has_handler: PhantomData,
            _has_response: PhantomData,
            _state: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }
}

// -------------------------------------------------------------------------------------------------
// Descriptive methods, available at any stage
// -------------------------------------------------------------------------------------------------
impl<H, R, S> OperationBuilder<H, R, S>
where
    H: HandlerSlot<S>,
{
    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.spec.operation_id = Some(id.into());
        self
    }

    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.spec.summary = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.spec.description = Some(text.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.tags.push(tag.into());
        self
    }

    /// Required path parameter with an explicit JSON Schema type.
    pub fn path_param(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        param_type: impl Into<String>,
    ) -> Self {
        self.spec.params.push(ParamSpec {
            name: name.into(),
            location: ParamLocation::Path,
            required: true,
            description: Some(description.into()),
            param_type: param_type.into(),
        });
        self
    }

    pub fn query_param(
        mut self,
        name: impl Into<String>,
        required: bool,
        description: impl Into<String>,
        param_type: impl Into<String>,
    ) -> Self {
        self.spec.params.push(ParamSpec {
            name: name.into(),
            location: ParamLocation::Query,
            required,
            description: Some(description.into()),
            param_type: param_type.into(),
        });
        self
    }

    /// Required JSON request body; the schema of `T` is registered on the fly.
    pub fn json_request<T>(self, registry: &dyn OpenApiRegistry, desc: impl Into<String>) -> Self
    where
        T: utoipa::ToSchema + utoipa::PartialSchema + 'static,
    {
        self.request_body::<T>(registry, "application/json", desc)
    }

    /// Required `application/merge-patch+json` body (RFC 7396).
    pub fn merge_patch_request<T>(
        self,
        registry: &dyn OpenApiRegistry,
        desc: impl Into<String>,
    ) -> Self
    where
        T: utoipa::ToSchema + utoipa::PartialSchema + 'static,
    {
        self.request_body::<T>(registry, "application/merge-patch+json", desc)
    }

    fn request_body<T>(
        mut self,
        registry: &dyn OpenApiRegistry,
        content_type: &'static str,
        desc: impl Into<String>,
    ) -> Self
    where
        T: utoipa::ToSchema + utoipa::PartialSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.spec.request_body = Some(RequestBodySpec {
            content_type,
            description: Some(desc.into()),
            schema_name: Some(name),
            required: true,
        });
        self
    }

    // ---------------------------------------------------------------------------------------------
    // Responses: the first one moves R to Present
    // ---------------------------------------------------------------------------------------------

    pub fn response(mut self, resp: ResponseSpec) -> OperationBuilder<H, Present, S> {
        self.spec.responses.push(resp);
        OperationBuilder {
            spec: self.spec,
            method_router: self.method_router,
            _has_handler: self._has_handler,
            _has_response: PhantomData::<Present>,
            _state: self._state,
        }
    }

    pub fn json_response_with_schema<T>(
        self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + utoipa::PartialSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.response(ResponseSpec {
            status,
            content_type: Some("application/json"),
            description: description.into(),
            schema_name: Some(name),
            is_array: false,
        })
    }

    /// JSON array of `T`.
    pub fn json_list_response<T>(
        self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + utoipa::PartialSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.response(ResponseSpec {
            status,
            content_type: Some("application/json"),
            description: description.into(),
            schema_name: Some(name),
            is_array: true,
        })
    }

    pub fn empty_response(
        self,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        self.response(ResponseSpec {
            status,
            content_type: None,
            description: description.into(),
            schema_name: None,
            is_array: false,
        })
    }

    /// RFC 9457 `application/problem+json` response.
    pub fn problem_response(
        self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        let problem_name = ensure_schema::<problem::Problem>(registry);
        self.response(ResponseSpec {
            status,
            content_type: Some(problem::APPLICATION_PROBLEM_JSON),
            description: description.into(),
            schema_name: Some(problem_name),
            is_array: false,
        })
    }
}

impl<H, S> OperationBuilder<H, Present, S>
where
    H: HandlerSlot<S>,
{
    /// 400 and 500 problem responses shared by every resource operation.
    pub fn standard_errors(self, registry: &dyn OpenApiRegistry) -> Self {
        self.problem_response(registry, 400, "Bad Request")
            .problem_response(registry, 500, "Internal Server Error")
    }
}

// -------------------------------------------------------------------------------------------------
// Handler setting: Missing -> Present
// -------------------------------------------------------------------------------------------------
impl<R, S> OperationBuilder<Missing, R, S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn handler<F, T>(self, h: F) -> OperationBuilder<Present, R, S>
    where
        F: Handler<T, S> + Clone + Send + 'static,
        T: 'static,
    {
        let method_router = match self.spec.method {
            Method::GET => axum::routing::get(h),
            Method::POST => axum::routing::post(h),
            Method::PUT => axum::routing::put(h),
            Method::DELETE => axum::routing::delete(h),
            Method::PATCH => axum::routing::patch(h),
            _ => axum::routing::any(|| async { axum::http::StatusCode::METHOD_NOT_ALLOWED }),
        };

        OperationBuilder {
            spec: self.spec,
            method_router,
            _has_handler: PhantomData::<Present>,
            _has_response: self._has_response,
            _state: self._state,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Registration, only with both handler AND response present
// -------------------------------------------------------------------------------------------------
impl<S> OperationBuilder<Present, Present, S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Method routers registered on the same path are merged by axum, so each
    /// verb of a resource can be registered independently.
    pub fn register(self, router: Router<S>, openapi: &dyn OpenApiRegistry) -> Router<S> {
        openapi.register_operation(&self.spec);
        router.route(&self.spec.path, self.method_router)
    }
}
