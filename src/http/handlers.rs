//! Request handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use opentelemetry::trace::{Status, TraceContextExt, Tracer};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::http::server::AppState;
use crate::observability::logging::events;
use crate::observability::metrics::render_prometheus;

pub const HELLO_BODY: &str = "test hello";
pub const FETCH_FAILED_BODY: &str = "Hello World! failed to fetch /hello";

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// `GET /`: calls `/hello` under a new span and reports the trace id.
pub async fn root(State(state): State<AppState>) -> String {
    let parent = tracing::Span::current().context();
    let span = state
        .instrumentation
        .tracer()
        .start_with_context("hello round trip", &parent);
    let cx = parent.with_span(span);
    let trace_id = cx.span().span_context().trace_id();

    tracing::info!(
        event_id = events::ROOT_REQUEST,
        %trace_id,
        url = %state.hello_client.url(),
        "Calling hello endpoint"
    );

    let body = match state.hello_client.fetch(&cx).await {
        Ok(hello) => {
            tracing::info!(event_id = events::HELLO_FETCHED, %trace_id, response = %hello, "Hello endpoint responded");
            format!("Hello World! trace_id={trace_id} hello={hello}")
        }
        Err(e) => {
            cx.span().set_status(Status::error(e.to_string()));
            tracing::error!(event_id = events::HELLO_FETCH_FAILED, %trace_id, error = %e, "Failed to fetch hello endpoint");
            FETCH_FAILED_BODY.to_string()
        }
    };

    cx.span().end();
    body
}

/// `GET /hello`
pub async fn hello() -> &'static str {
    HELLO_BODY
}

/// `GET /increase-days`
pub async fn increase_days(State(state): State<AppState>) {
    state.instrumentation.add_days(1);
    tracing::debug!(event_id = events::FREEZING_DAYS_INCREASED, "Freezing days increased");
}

/// `GET /metrics`: Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> Response {
    let Some(registry) = state.prometheus.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match render_prometheus(registry) {
        Ok(body) => ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
