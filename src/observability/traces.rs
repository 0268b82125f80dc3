//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build the SDK tracer provider for the selected exporter
//! - Extract trace context from incoming requests
//! - Propagate trace context on outbound requests
//!
//! # Design Decisions
//! - Every span is sampled
//! - W3C Trace Context headers only
//! - Console spans are exported synchronously, remote exporters batch

use axum::http::HeaderMap;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::Context;
use opentelemetry_http::{HeaderExtractor, HeaderInjector};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;

use crate::config::ServiceConfig;
use crate::observability::selector::{ExporterSelection, TracingExporterKind};
use crate::observability::TelemetryError;

pub fn build_tracer_provider(
    selection: &ExporterSelection,
    config: &ServiceConfig,
    resource: Resource,
) -> Result<SdkTracerProvider, TelemetryError> {
    let builder = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_sampler(Sampler::AlwaysOn);

    let builder = match selection.tracing {
        TracingExporterKind::Zipkin => {
            let exporter = opentelemetry_zipkin::ZipkinExporter::builder()
                .with_collector_endpoint(config.zipkin.endpoint.clone())
                .build()
                .map_err(TelemetryError::exporter("tracing"))?;
            builder.with_batch_exporter(exporter)
        }
        TracingExporterKind::Otlp => {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(config.otlp.endpoint.clone())
                .build()
                .map_err(TelemetryError::exporter("tracing"))?;
            builder.with_batch_exporter(exporter)
        }
        TracingExporterKind::Console => {
            builder.with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        }
    };

    Ok(builder.build())
}

/// Write `cx` into `headers` as `traceparent`/`tracestate`.
pub fn inject_context(cx: &Context, headers: &mut HeaderMap) {
    TraceContextPropagator::new().inject_context(cx, &mut HeaderInjector(headers));
}

/// Read the remote parent context from `headers`. Returns an empty context
/// when no valid `traceparent` is present.
pub fn extract_context(headers: &HeaderMap) -> Context {
    TraceContextPropagator::new().extract(&HeaderExtractor(headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{
        SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
    };

    #[test]
    fn context_survives_header_round_trip() {
        let span_context = SpanContext::new(
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
            SpanId::from_hex("00f067aa0ba902b7").unwrap(),
            TraceFlags::SAMPLED,
            false,
            TraceState::default(),
        );
        let cx = Context::new().with_remote_span_context(span_context);

        let mut headers = HeaderMap::new();
        inject_context(&cx, &mut headers);
        assert_eq!(
            headers.get("traceparent").unwrap(),
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"
        );

        let extracted = extract_context(&headers);
        let extracted_span = extracted.span();
        assert_eq!(
            extracted_span.span_context().trace_id().to_string(),
            "4bf92f3577b34da6a3ce929d0e0e4736"
        );
        assert!(extracted_span.span_context().is_remote());
    }

    #[test]
    fn missing_header_yields_invalid_context() {
        let cx = extract_context(&HeaderMap::new());
        assert!(!cx.span().span_context().is_valid());
    }
}
