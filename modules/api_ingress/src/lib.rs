//! HTTP host: owns the listener, the shared middleware stack, `/health` and
//! the OpenAPI document assembled from every registered module operation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Router};
use modkit::api::OpenApiRegistry;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod openapi;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use openapi::OpenApiDocument;

const BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;

pub struct ApiIngress {
    config: ApiIngressConfig,
    openapi: OpenApiDocument,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            openapi: OpenApiDocument::new(),
        }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Registry handed to modules while they register their routes.
    pub fn registry(&self) -> &dyn OpenApiRegistry {
        &self.openapi
    }

    /// Mount module routes under the API prefix and wrap everything in the
    /// shared middleware stack.
    pub fn build_router(&self, api: Router) -> Result<Router> {
        let prefix = self.config.normalized_prefix();
        let mut router = Router::new().route("/health", get(web::health_check));

        router = if prefix.is_empty() {
            router.merge(api)
        } else {
            router.nest(&prefix, api)
        };

        if self.config.enable_docs {
            let doc = Arc::new(self.openapi.to_json(
                &prefix,
                "Notebook API",
                env!("CARGO_PKG_VERSION"),
            )?);
            router = router
                .route("/openapi.json", get(web::openapi_json).with_state(doc))
                .route("/docs", get(web::serve_docs));
        }

        // Layers are added innermost first; on the way in a request passes
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
        // -> Timeout -> CORS -> BodyLimit.
        router = router.layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));
        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router = router
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_sec.max(1),
            )))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer());

        let x_request_id = request_id::header();
        router = router
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    /// `bind_addr` from config, falling back to the given default address.
    pub fn bind_addr(&self, fallback: &str) -> Result<SocketAddr> {
        let raw = self.config.bind_addr.as_deref().unwrap_or(fallback);
        raw.parse()
            .with_context(|| format!("invalid bind address '{raw}'"))
    }

    /// Bind and serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve<F>(addr: SocketAddr, router: Router, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!(%addr, "HTTP server bound");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .context("HTTP server failed")
    }
}
