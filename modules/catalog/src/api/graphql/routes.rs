use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{response::Html, routing::get, Extension, Router};
use tracing::debug;

use super::CatalogSchema;

/// Mount the GraphQL endpoint at `path`: POST executes, GET serves GraphiQL
/// when enabled.
pub fn register_routes(router: Router, schema: CatalogSchema, path: &str, graphiql: bool) -> Router {
    let endpoint = if graphiql {
        let page = Html(GraphiQLSource::build().endpoint(path).finish());
        get(move || {
            let page = page.clone();
            async move { page }
        })
        .post(graphql_handler)
    } else {
        axum::routing::post(graphql_handler)
    };

    debug!(path, graphiql, "Registered GraphQL endpoint");
    router.merge(Router::new().route(path, endpoint).layer(Extension(schema)))
}

async fn graphql_handler(
    Extension(schema): Extension<CatalogSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let request = req.into_inner();
    debug!(operation = ?request.operation_name, "Executing GraphQL request");
    schema.execute(request).await.into()
}
