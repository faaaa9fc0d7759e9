//! Notebook sharing module: NoteBook and Share resources over a relational store.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::model;

// === ERROR CATALOG ===
pub mod errors;

// === MODULE WIRING ===
pub mod module;
pub use module::NotebookModule;

// === INTERNAL MODULES ===
// Exposed for integration tests; consumers should stick to `contract` and `module`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
