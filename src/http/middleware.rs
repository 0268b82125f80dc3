//! Request instrumentation middleware.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::http::server::AppState;
use crate::observability::traces;

/// Server span for one request, parented to the caller's trace if the
/// request carries a `traceparent` header.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let span = tracing::info_span!(
        "http_request",
        otel.kind = "server",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    );
    span.set_parent(traces::extract_context(request.headers()));
    span
}

/// Records `http.server.request.duration` for every routed request.
pub async fn record_http_metrics(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;

    state
        .http_metrics
        .record_request(method.as_str(), &route, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use opentelemetry::trace::{TraceContextExt, TracerProvider as _};
    use opentelemetry_sdk::trace::SdkTracerProvider;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";

    fn with_otel_layer<R>(f: impl FnOnce() -> R) -> R {
        let provider = SdkTracerProvider::builder().build();
        let subscriber = tracing_subscriber::registry()
            .with(tracing_opentelemetry::layer().with_tracer(provider.tracer("middleware-test")));
        tracing::subscriber::with_default(subscriber, f)
    }

    #[test]
    fn request_span_joins_incoming_trace() {
        let request = Request::builder()
            .uri("/hello")
            .header("traceparent", format!("00-{TRACE_ID}-00f067aa0ba902b7-01"))
            .body(Body::empty())
            .unwrap();

        let trace_id = with_otel_layer(|| {
            let span = make_request_span(&request);
            span.context().span().span_context().trace_id().to_string()
        });
        assert_eq!(trace_id, TRACE_ID);
    }

    #[test]
    fn request_span_without_parent_starts_new_trace() {
        let request = Request::builder().uri("/hello").body(Body::empty()).unwrap();

        let trace_id = with_otel_layer(|| {
            let span = make_request_span(&request);
            span.context().span().span_context().trace_id().to_string()
        });
        assert_ne!(trace_id, TRACE_ID);
        assert_ne!(trace_id, "0".repeat(32));
    }
}
