//! Users and movies catalog: contract types, domain service, MongoDB and
//! in-memory storage, and the GraphQL schema served over axum.

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
mod module;

pub use api::graphql::{build_schema, CatalogSchema};
pub use config::CatalogConfig;
pub use domain::error::DomainError;
pub use infra::storage::{CatalogStore, InMemoryStore, StoreOptions};
pub use module::Catalog;

/// Name of the config section under `modules`.
pub const MODULE_NAME: &str = "catalog";
