//! Mapping of domain failures to RFC 9457 problems plus the application
//! alert headers.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::{request::Parts, HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use modkit::api::problem::{Problem, ProblemResponse, ValidationError};
use modkit_errors::ErrDef;
use tracing::{error, warn};

use crate::domain::error::DomainError;
use crate::errors;

/// Builder for the `X-{app}-alert`, `X-{app}-error` and `X-{app}-params`
/// headers. Header names are checked once, when the module is wired.
#[derive(Debug, Clone)]
pub struct Alerts {
    app_name: String,
    alert: HeaderName,
    error: HeaderName,
    params: HeaderName,
}

impl Alerts {
    pub fn new(app_name: &str) -> anyhow::Result<Self> {
        let name = |suffix: &str| -> anyhow::Result<HeaderName> {
            HeaderName::try_from(format!("x-{app_name}-{suffix}")).map_err(|e| {
                anyhow::anyhow!("app_name '{app_name}' is not usable in a header name: {e}")
            })
        };
        Ok(Self {
            app_name: app_name.to_string(),
            alert: name("alert")?,
            error: name("error")?,
            params: name("params")?,
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// `X-{app}-alert: {app}.{entity}.{action}` and `X-{app}-params: {id}`.
    pub fn entity_alert(&self, entity: &str, action: &str, id: Option<i64>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        self.insert(
            &mut headers,
            self.alert.clone(),
            format!("{}.{entity}.{action}", self.app_name),
        );
        if let Some(id) = id {
            self.insert(&mut headers, self.params.clone(), id.to_string());
        }
        headers
    }

    /// `X-{app}-error: error.{key}` and `X-{app}-params: {entity}`.
    pub fn failure_alert(&self, entity: &str, key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        self.insert(&mut headers, self.error.clone(), format!("error.{key}"));
        self.insert(&mut headers, self.params.clone(), entity.to_string());
        headers
    }

    fn insert(&self, headers: &mut HeaderMap, name: HeaderName, value: String) {
        match HeaderValue::try_from(value) {
            Ok(v) => {
                headers.insert(name, v);
            }
            Err(e) => warn!(header = %name, error = %e, "skipping invalid alert header value"),
        }
    }
}

/// Request coordinates echoed back in problems.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub path: String,
    pub request_id: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for RequestMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.0.path().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());
        let request_id = parts
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(Self { path, request_id })
    }
}

/// Problem response with optional alert headers.
#[derive(Debug)]
pub struct RestError {
    pub problem: Problem,
    pub headers: HeaderMap,
}

impl RestError {
    pub fn new(def: &ErrDef, detail: impl Into<String>, meta: &RequestMeta) -> Self {
        let mut problem = def.to_problem_at(detail, meta.path.as_str());
        if let Some(id) = &meta.request_id {
            problem = problem.with_request_id(id.as_str());
        }
        Self {
            problem,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Malformed body, path or query.
    pub fn bad_request(detail: impl Into<String>, meta: &RequestMeta) -> Self {
        Self::new(&errors::BAD_REQUEST, detail, meta)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        (self.headers, ProblemResponse(self.problem)).into_response()
    }
}

/// Map domain error to RFC 9457 problem with alert headers.
pub fn map_domain_error(e: &DomainError, meta: &RequestMeta, alerts: &Alerts) -> RestError {
    let def = match e {
        DomainError::IdExists { .. } => &errors::ID_EXISTS,
        DomainError::IdNull { .. } => &errors::ID_NULL,
        DomainError::IdInvalid { .. } => &errors::ID_INVALID,
        DomainError::IdNotFound { .. } => &errors::ID_NOT_FOUND,
        DomainError::NotFound { .. } => &errors::NOT_FOUND,
        DomainError::Validation { .. } => &errors::VALIDATION,
        DomainError::Database { message } => {
            // Log the real error, return a generic message to the client.
            error!(path = %meta.path, "database error: {}", message);
            return RestError::new(&errors::INTERNAL, "An internal database error occurred", meta);
        }
    };

    let mut err = RestError::new(def, e.to_string(), meta);
    match e {
        DomainError::Validation { violations, .. } => {
            err.problem = err.problem.with_errors(
                violations
                    .iter()
                    .map(|v| ValidationError::new(format!("/{}", v.field), v.message.as_str()))
                    .collect(),
            );
        }
        // Title names the entity.
        DomainError::IdExists { .. } => err.problem = err.problem.with_title(e.to_string()),
        _ => {}
    }

    match (e, e.entity()) {
        (DomainError::NotFound { .. }, _) | (_, None) => err,
        (_, Some(entity)) => {
            let headers = alerts.failure_alert(entity, def.code);
            err.with_headers(headers)
        }
    }
}
