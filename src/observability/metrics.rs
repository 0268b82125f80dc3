//! Metrics pipeline and HTTP instruments.
//!
//! # Responsibilities
//! - Build the SDK meter provider for the selected exporter
//! - Apply exponential bucketing to histograms when configured
//! - Record server and client request durations
//! - Render the Prometheus registry for `GET /metrics`
//!
//! # Metrics
//! - `http.server.request.duration` (histogram, s): by method, route, status
//! - `http.client.request.duration` (histogram, s): by method, status
//! - `weather.days.freezing` (counter): see `instrumentation.rs`

use std::time::{Duration, Instant};

use opentelemetry::metrics::{Histogram, MeterProvider as _};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::{
    new_view, Aggregation, Instrument, InstrumentKind, PeriodicReader, SdkMeterProvider, Stream,
};
use opentelemetry_sdk::Resource;
use prometheus::{Encoder, Registry, TextEncoder};

use crate::config::ServiceConfig;
use crate::observability::selector::{ExporterSelection, HistogramAggregation, MetricsExporterKind};
use crate::observability::TelemetryError;

/// Scope name for the HTTP server and client instruments.
const HTTP_METER_NAME: &str = "weather-telemetry.http";

// Matches the defaults other SDKs use for base-2 exponential histograms.
const EXPONENTIAL_MAX_SIZE: u32 = 160;
const EXPONENTIAL_MAX_SCALE: i8 = 20;

/// A meter provider plus the registry backing the scrape endpoint, if any.
pub struct MeterPipeline {
    pub provider: SdkMeterProvider,
    pub registry: Option<Registry>,
}

pub fn build_meter_provider(
    selection: &ExporterSelection,
    config: &ServiceConfig,
    resource: Resource,
) -> Result<MeterPipeline, TelemetryError> {
    let mut builder = SdkMeterProvider::builder().with_resource(resource);

    if selection.histogram == HistogramAggregation::Exponential {
        let mut criteria = Instrument::new();
        criteria.kind = Some(InstrumentKind::Histogram);
        let view = new_view(
            criteria,
            Stream::new().aggregation(Aggregation::Base2ExponentialHistogram {
                max_size: EXPONENTIAL_MAX_SIZE,
                max_scale: EXPONENTIAL_MAX_SCALE,
                record_min_max: true,
            }),
        )
        .map_err(|e| TelemetryError::View(e.to_string()))?;
        builder = builder.with_view(view);
    }

    let mut registry = None;
    let builder = match selection.metrics {
        MetricsExporterKind::Prometheus => {
            let scrape_registry = Registry::new();
            let exporter = opentelemetry_prometheus::exporter()
                .with_registry(scrape_registry.clone())
                .build()
                .map_err(TelemetryError::exporter("metrics"))?;
            registry = Some(scrape_registry);
            builder.with_reader(exporter)
        }
        MetricsExporterKind::Otlp => {
            let exporter = opentelemetry_otlp::MetricExporter::builder()
                .with_tonic()
                .with_endpoint(config.otlp.endpoint.clone())
                .build()
                .map_err(TelemetryError::exporter("metrics"))?;
            builder.with_reader(PeriodicReader::builder(exporter).build())
        }
        MetricsExporterKind::Console => {
            let reader = PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default())
                .with_interval(Duration::from_millis(config.console.export_interval_ms))
                .build();
            builder.with_reader(reader)
        }
    };

    Ok(MeterPipeline {
        provider: builder.build(),
        registry,
    })
}

/// Render every metric family in `registry` in the Prometheus text format.
pub fn render_prometheus(registry: &Registry) -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Request duration instruments for the HTTP server and the self-call client.
#[derive(Clone)]
pub struct HttpMetrics {
    server_duration: Histogram<f64>,
    client_duration: Histogram<f64>,
}

impl HttpMetrics {
    pub fn new(provider: &SdkMeterProvider) -> Self {
        let meter = provider.meter(HTTP_METER_NAME);
        Self {
            server_duration: meter
                .f64_histogram("http.server.request.duration")
                .with_unit("s")
                .with_description("Duration of HTTP server requests")
                .build(),
            client_duration: meter
                .f64_histogram("http.client.request.duration")
                .with_unit("s")
                .with_description("Duration of HTTP client requests")
                .build(),
        }
    }

    /// Record a completed inbound request.
    pub fn record_request(&self, method: &str, route: &str, status: u16, start: Instant) {
        self.server_duration.record(
            start.elapsed().as_secs_f64(),
            &[
                KeyValue::new("http.request.method", method.to_string()),
                KeyValue::new("http.route", route.to_string()),
                KeyValue::new("http.response.status_code", i64::from(status)),
            ],
        );
    }

    /// Record an outbound request. `status` is `None` when no response arrived.
    pub fn record_client_request(&self, method: &str, status: Option<u16>, start: Instant) {
        let mut attributes = vec![KeyValue::new("http.request.method", method.to_string())];
        match status {
            Some(status) => attributes.push(KeyValue::new("http.response.status_code", i64::from(status))),
            None => attributes.push(KeyValue::new("error.type", "transport")),
        }
        self.client_duration.record(start.elapsed().as_secs_f64(), &attributes);
    }
}
