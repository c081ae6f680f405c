use serde::{Deserialize, Serialize};

/// `modules.api_ingress` configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// Path of the GraphQL endpoint
    pub graphql_path: String,
    /// Serve the GraphiQL IDE on `GET <graphql_path>`
    pub graphiql: bool,
    pub cors_enabled: bool,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            graphql_path: "/graphql".to_string(),
            graphiql: true,
            cors_enabled: true,
            body_limit_bytes: 1024 * 1024,
        }
    }
}
