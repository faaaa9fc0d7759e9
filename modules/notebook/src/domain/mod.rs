pub mod entity;
pub mod error;
pub mod repo;
pub mod service;

pub use entity::Entity;
pub use error::{DomainError, FieldViolation};
pub use repo::Repository;
pub use service::EntityService;
