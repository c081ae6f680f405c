//! GraphQL surface of the catalog.
//!
//! ```graphql
//! mutation { addMovie(title: "Dune", genre: "Sci-Fi", rating: 9, duration: "155") { id } }
//! { movie(id: "65f0c0ffee0000000000abcd") { title rating createdAt } }
//! ```

pub mod error;
pub mod mutation;
pub mod query;
pub mod routes;
pub mod types;

use async_graphql::{EmptySubscription, Schema};
use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::domain::service::Service;
use mutation::Mutation;
use query::Query;

pub type CatalogSchema = Schema<Query, Mutation, EmptySubscription>;

/// Build the schema with the service as context data
pub fn build_schema(service: Arc<Service>, config: &CatalogConfig) -> CatalogSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(service)
        .limit_depth(config.max_query_depth)
        .limit_complexity(config.max_query_complexity)
        .finish()
}
