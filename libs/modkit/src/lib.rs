//! # ModKit
//!
//! Shared building blocks for the REST modules: RFC 9457 problem responses,
//! the type-safe operation builder that keeps routes and their OpenAPI
//! description in one place, and process shutdown signalling.

pub use anyhow::Result;

// Type-safe API operation builder
pub mod api;
pub use api::problem::{Problem, ProblemResponse, ValidationError, APPLICATION_PROBLEM_JSON};
pub use api::{ensure_schema, OpenApiRegistry, OperationBuilder, OperationSpec};

pub mod runtime;
pub use runtime::shutdown::wait_for_shutdown;
