//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, server spans, timeout, request metrics)
//! - Expose the Prometheus scrape endpoint when that exporter is selected
//! - Bind server to listener and drain on shutdown

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use prometheus::Registry;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::client::HelloClient;
use crate::http::handlers;
use crate::http::middleware::{make_request_span, record_http_metrics};
use crate::observability::{HttpMetrics, Instrumentation, Telemetry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub instrumentation: Arc<Instrumentation>,
    pub http_metrics: HttpMetrics,
    pub hello_client: HelloClient,
    pub prometheus: Option<Registry>,
}

/// HTTP server for the demo endpoints.
pub struct HttpServer {
    config: ServiceConfig,
    instrumentation: Arc<Instrumentation>,
    http_metrics: HttpMetrics,
    prometheus: Option<Registry>,
}

impl HttpServer {
    /// Create a new HTTP server backed by `telemetry`.
    pub fn new(config: ServiceConfig, telemetry: &Telemetry) -> Self {
        Self {
            config,
            instrumentation: Arc::new(telemetry.instrumentation()),
            http_metrics: telemetry.http_metrics(),
            prometheus: telemetry.prometheus_registry().cloned(),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", get(handlers::root))
            .route("/hello", get(handlers::hello))
            .route("/increase-days", get(handlers::increase_days));

        if state.prometheus.is_some() {
            router = router.route("/metrics", get(handlers::metrics));
        }

        router
            .route_layer(middleware::from_fn_with_state(state.clone(), record_http_metrics))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` resolves, then drain open requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;

        let base_url = self
            .config
            .self_call
            .base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", loopback_for(addr)));
        let hello_client = HelloClient::new(
            &base_url,
            Duration::from_secs(self.config.timeouts.self_call_secs),
            self.http_metrics.clone(),
        )
        .map_err(std::io::Error::other)?;

        let state = AppState {
            instrumentation: self.instrumentation,
            http_metrics: self.http_metrics,
            hello_client,
            prometheus: self.prometheus,
        };
        let scrape_enabled = state.prometheus.is_some();
        let app = Self::build_router(&self.config, state);

        tracing::info!(
            address = %addr,
            self_call = %base_url,
            metrics_endpoint = scrape_enabled,
            "HTTP server starting"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Address the server can reach itself on. Wildcard binds map to loopback.
fn loopback_for(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(Ipv4Addr::LOCALHOST.into(), addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(Ipv6Addr::LOCALHOST.into(), addr.port()),
        _ => addr,
    }
}
