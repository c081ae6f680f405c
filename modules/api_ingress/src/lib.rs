use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Router};
use runtime::AppConfig;
use tokio_util::sync::CancellationToken;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod error;
pub mod request_id;
pub mod security;
mod web;

pub use config::ApiIngressConfig;

/// Name of the config section under `modules`.
pub const MODULE_NAME: &str = "api_ingress";

/// HTTP gateway: owns the listener and the middleware stack around the routes
/// contributed by other modules.
#[derive(Debug, Clone)]
pub struct ApiIngress {
    config: ApiIngressConfig,
    bind_addr: SocketAddr,
    timeout: Option<Duration>,
    production: bool,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig, bind_addr: SocketAddr) -> Self {
        Self {
            config,
            bind_addr,
            timeout: None,
            production: false,
        }
    }

    /// Build from the `server` section and `modules.api_ingress`.
    pub fn from_app_config(app: &AppConfig) -> Result<Self> {
        let config = app.module_config::<ApiIngressConfig>(MODULE_NAME)?;
        let raw = format!("{}:{}", app.server.host, app.server.port);
        let bind_addr: SocketAddr = raw
            .parse()
            .with_context(|| format!("Invalid bind address '{raw}'"))?;

        let timeout = (app.server.timeout_sec > 0).then(|| Duration::from_secs(app.server.timeout_sec));
        tracing::debug!(
            module = MODULE_NAME,
            %bind_addr,
            graphql_path = %config.graphql_path,
            ?timeout,
            "API ingress configured"
        );

        Ok(Self {
            config,
            bind_addr,
            timeout,
            production: app.server.environment.is_production(),
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Router with the gateway's own endpoints; modules merge their routes into it.
    pub fn base_router(&self) -> Router {
        Router::new().route("/health", get(web::health_check))
    }

    /// Attach the fallback and the middleware stack.
    pub fn finalize(&self, router: Router) -> Router {
        let mut router = router.fallback(error::not_found);

        // Layers are added innermost first; the last one added sees the request first.
        // Outermost to innermost:
        // PropagateRequestId -> SetRequestId -> push_req_id_to_extensions -> Trace
        //   -> Timeout -> SecurityHeaders -> CORS -> BodyLimit -> CatchPanic
        router = router.layer(CatchPanicLayer::custom(error::panic_response));

        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::very_permissive());
        }

        router = security::apply(router, self.production);

        if let Some(timeout) = self.timeout {
            router = router.layer(TimeoutLayer::new(timeout));
        }

        router = router.layer(request_id::create_trace_layer());

        router = router.layer(from_fn(request_id::push_req_id_to_extensions));

        let x_request_id = request_id::header();
        router = router.layer(SetRequestIdLayer::new(
            x_request_id.clone(),
            request_id::MakeReqId,
        ));
        router = router.layer(PropagateRequestIdLayer::new(x_request_id));

        router
    }

    /// Bind, then serve until `cancel` fires.
    pub async fn serve(&self, router: Router, cancel: CancellationToken) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.bind_addr))?;
        self.serve_on(listener, router, cancel).await
    }

    pub async fn serve_on(
        &self,
        listener: tokio::net::TcpListener,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!("HTTP server bound on {}", addr);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
