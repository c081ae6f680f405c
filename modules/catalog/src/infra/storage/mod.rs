pub mod entity;
pub mod mapper;
pub mod memory_repo;
pub mod mongo_repo;

pub use memory_repo::InMemoryStore;
pub use mongo_repo::{CatalogStore, StoreOptions};
