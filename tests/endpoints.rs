//! End-to-end tests for the HTTP endpoints.

use axum::http::StatusCode;
use weather_telemetry::config::ServiceConfig;
use weather_telemetry::http::handlers::{FETCH_FAILED_BODY, HELLO_BODY};

mod common;

#[tokio::test]
async fn hello_is_static_for_every_exporter() {
    for metrics in ["console", "prometheus", "garbage"] {
        let config = ServiceConfig {
            use_metrics_exporter: metrics.into(),
            ..ServiceConfig::default()
        };
        let service = common::start_service(config).await;

        let res = common::client().get(service.url("/hello")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.text().await.unwrap(), HELLO_BODY);
    }
}

#[tokio::test]
async fn increase_days_is_visible_in_scrape() {
    let service = common::start_service(common::prometheus_config()).await;
    let client = common::client();

    let scrape = |client: reqwest::Client, url: String| async move {
        let res = client.get(url).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.text().await.unwrap()
    };

    let before = common::freezing_days(&scrape(client.clone(), service.url("/metrics")).await);

    let k = 7;
    for _ in 0..k {
        let res = client.get(service.url("/increase-days")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let after = scrape(client.clone(), service.url("/metrics")).await;
    assert_eq!(common::freezing_days(&after), before + k);
    assert!(after.contains("http_server_request_duration"), "server histogram missing:\n{after}");
}

#[tokio::test]
async fn metrics_route_only_with_prometheus() {
    let service = common::start_service(ServiceConfig::default()).await;

    let res = common::client().get(service.url("/metrics")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn root_reports_trace_id_after_self_call() {
    let service = common::start_service(ServiceConfig::default()).await;

    let body = common::client()
        .get(service.url("/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    let trace_id = body
        .split_whitespace()
        .find_map(|part| part.strip_prefix("trace_id="))
        .unwrap_or_else(|| panic!("no trace id in {body:?}"));
    assert_eq!(trace_id.len(), 32);
    assert!(trace_id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(trace_id, "0".repeat(32));
    assert!(body.ends_with(&format!("hello={HELLO_BODY}")), "unexpected body {body:?}");
}

#[tokio::test]
async fn self_call_carries_root_trace_id() {
    let (hello_addr, traceparents) = common::start_hello_recorder().await;
    let mut config = ServiceConfig::default();
    config.self_call.base_url = Some(format!("http://{hello_addr}"));
    let service = common::start_service(config).await;

    let body = common::client()
        .get(service.url("/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let trace_id = body
        .split_whitespace()
        .find_map(|part| part.strip_prefix("trace_id="))
        .unwrap_or_else(|| panic!("no trace id in {body:?}"))
        .to_owned();

    let traceparents = traceparents.lock().unwrap().clone();
    assert_eq!(traceparents.len(), 1, "{traceparents:?}");
    let fields: Vec<&str> = traceparents[0].split('-').collect();
    assert_eq!(fields.len(), 4, "{}", traceparents[0]);
    assert_eq!(fields[0], "00");
    assert_eq!(fields[1], trace_id);
    assert_eq!(fields[3], "01", "self-call should be sampled");
}

#[tokio::test]
async fn root_reports_failure_when_hello_unreachable() {
    let dead = common::unused_addr().await;
    let mut config = ServiceConfig::default();
    config.self_call.base_url = Some(format!("http://{dead}"));
    config.timeouts.self_call_secs = 2;
    let service = common::start_service(config).await;

    let res = common::client().get(service.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), FETCH_FAILED_BODY);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let service = common::start_service(ServiceConfig::default()).await;

    let res = common::client().get(service.url("/hello")).send().await.unwrap();
    let request_id = res.headers().get("x-request-id").expect("x-request-id header");
    assert!(!request_id.is_empty());
}
