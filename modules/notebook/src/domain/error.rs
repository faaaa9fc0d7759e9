use thiserror::Error;

/// A single failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("A new {entity} cannot already have an ID")]
    IdExists { entity: &'static str },

    #[error("Invalid id: {entity} payload carries no id")]
    IdNull { entity: &'static str },

    #[error("Invalid ID: path id {path_id} does not match payload id {body_id}")]
    IdInvalid {
        entity: &'static str,
        path_id: i64,
        body_id: i64,
    },

    #[error("Entity not found: no {entity} with id {id}")]
    IdNotFound { entity: &'static str, id: i64 },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Validation failed for {entity}: {} violation(s)", violations.len())]
    Validation {
        entity: &'static str,
        violations: Vec<FieldViolation>,
    },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn id_exists(entity: &'static str) -> Self {
        Self::IdExists { entity }
    }

    pub fn id_null(entity: &'static str) -> Self {
        Self::IdNull { entity }
    }

    pub fn id_invalid(entity: &'static str, path_id: i64, body_id: i64) -> Self {
        Self::IdInvalid {
            entity,
            path_id,
            body_id,
        }
    }

    pub fn id_not_found(entity: &'static str, id: i64) -> Self {
        Self::IdNotFound { entity, id }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(entity: &'static str, violations: Vec<FieldViolation>) -> Self {
        Self::Validation { entity, violations }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Entity name the error refers to, if any.
    pub fn entity(&self) -> Option<&'static str> {
        match self {
            Self::IdExists { entity }
            | Self::IdNull { entity }
            | Self::IdInvalid { entity, .. }
            | Self::IdNotFound { entity, .. }
            | Self::NotFound { entity, .. }
            | Self::Validation { entity, .. } => Some(entity),
            Self::Database { .. } => None,
        }
    }
}
