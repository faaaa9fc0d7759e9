//! SeaORM table models. References are plain nullable id columns; eager
//! resolution batches lookups in the repository instead of using joins.
pub mod note;
pub mod note_book;
pub mod share;
pub mod user;
