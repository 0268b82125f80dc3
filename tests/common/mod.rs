//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::http::HeaderMap;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use weather_telemetry::config::ServiceConfig;
use weather_telemetry::http::handlers::HELLO_BODY;
use weather_telemetry::http::HttpServer;
use weather_telemetry::lifecycle::Shutdown;
use weather_telemetry::Telemetry;

/// A running service on a loopback port. Stops the server when dropped.
pub struct TestService {
    pub addr: SocketAddr,
    pub telemetry: Telemetry,
    shutdown: Shutdown,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Build the telemetry pipeline for `config` and serve it on 127.0.0.1:0.
pub async fn start_service(config: ServiceConfig) -> TestService {
    let telemetry = Telemetry::init(&config).expect("telemetry pipeline");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, &telemetry);
    let server_shutdown = shutdown.signalled();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestService {
        addr,
        telemetry,
        shutdown,
    }
}

/// Config with the Prometheus exporter so counters can be read back.
pub fn prometheus_config() -> ServiceConfig {
    ServiceConfig {
        use_metrics_exporter: "prometheus".into(),
        ..ServiceConfig::default()
    }
}

/// A loopback address with nothing listening on it.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Value of `weather_days_freezing_total` in a Prometheus scrape, 0 if absent.
pub fn freezing_days(scrape: &str) -> u64 {
    scrape
        .lines()
        .filter(|line| line.starts_with("weather_days_freezing_total"))
        .filter_map(|line| line.split_whitespace().last())
        .filter_map(|value| value.parse::<f64>().ok())
        .map(|value| value as u64)
        .sum()
}

/// A stand-in `/hello` that answers like the real one and records the
/// `traceparent` header of every call.
pub async fn start_hello_recorder() -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let app = Router::new().route(
        "/hello",
        get(move |headers: HeaderMap| {
            let recorder = recorder.clone();
            async move {
                if let Some(value) = headers.get("traceparent").and_then(|v| v.to_str().ok()) {
                    recorder.lock().unwrap().push(value.to_owned());
                }
                HELLO_BODY
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, seen)
}
