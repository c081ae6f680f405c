use std::sync::Arc;

use axum::Router;

use crate::api::graphql::{self, CatalogSchema};
use crate::config::CatalogConfig;
use crate::domain::repo::{MoviesRepository, UsersRepository};
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::{CatalogStore, InMemoryStore};

/// Wired catalog: domain service plus the GraphQL schema built on top of it.
#[derive(Clone)]
pub struct Catalog {
    service: Arc<Service>,
    schema: CatalogSchema,
}

impl Catalog {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        movies: Arc<dyn MoviesRepository>,
        config: &CatalogConfig,
    ) -> Self {
        let service = Arc::new(Service::new(
            users,
            movies,
            ServiceConfig {
                bcrypt_cost: config.bcrypt_cost,
            },
        ));
        let schema = graphql::build_schema(service.clone(), config);
        tracing::debug!(
            bcrypt_cost = config.bcrypt_cost,
            max_query_depth = config.max_query_depth,
            "Catalog initialized"
        );
        Self { service, schema }
    }

    pub fn from_store(store: &CatalogStore, config: &CatalogConfig) -> Self {
        Self::new(Arc::new(store.users()), Arc::new(store.movies()), config)
    }

    /// Catalog over a fresh process-local store.
    pub fn in_memory(config: &CatalogConfig) -> Self {
        let store = InMemoryStore::new();
        Self::new(Arc::new(store.users()), Arc::new(store.movies()), config)
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn schema(&self) -> CatalogSchema {
        self.schema.clone()
    }

    /// GraphQL schema in SDL form.
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }

    pub fn register_routes(&self, router: Router, path: &str, graphiql: bool) -> Router {
        graphql::routes::register_routes(router, self.schema(), path, graphiql)
    }
}
