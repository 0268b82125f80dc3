//! Structured logging.
//!
//! # Responsibilities
//! - Build the SDK logger provider for the selected exporter
//! - Install the global `tracing` subscriber
//!
//! # Design Decisions
//! - Application code logs with `tracing` macros; an event id travels as a
//!   plain `event_id` field
//! - Events reach the log exporter through the OpenTelemetry bridge, spans
//!   reach the tracer through `tracing-opentelemetry`
//! - A local fmt layer is only added when logs leave the process
//! - Log level configurable via config and `RUST_LOG`

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ServiceConfig;
use crate::observability::instrumentation::INSTRUMENTATION_NAME;
use crate::observability::selector::{ExporterSelection, LogExporterKind};
use crate::observability::TelemetryError;

/// Event ids attached to the service's own log lines.
pub mod events {
    pub const SERVICE_STARTING: u32 = 1000;
    pub const CONFIG_LOADED: u32 = 1001;
    pub const TELEMETRY_CONFIGURED: u32 = 1002;
    pub const SHUTDOWN: u32 = 1003;
    pub const ROOT_REQUEST: u32 = 2000;
    pub const HELLO_FETCHED: u32 = 2001;
    pub const HELLO_FETCH_FAILED: u32 = 2002;
    pub const FREEZING_DAYS_INCREASED: u32 = 2003;
}

// Exporter transports log through `tracing` too; keep them out of the bridge
// so exporting a log line never produces another one.
const BRIDGE_FILTER: &str = "info,hyper=off,h2=off,tonic=off,tower=off,reqwest=off,opentelemetry=off";

pub fn build_logger_provider(
    selection: &ExporterSelection,
    config: &ServiceConfig,
    resource: Resource,
) -> Result<SdkLoggerProvider, TelemetryError> {
    let builder = SdkLoggerProvider::builder().with_resource(resource);

    let builder = match selection.logs {
        LogExporterKind::Otlp => {
            let exporter = opentelemetry_otlp::LogExporter::builder()
                .with_tonic()
                .with_endpoint(config.otlp.endpoint.clone())
                .build()
                .map_err(TelemetryError::exporter("logs"))?;
            builder.with_batch_exporter(exporter)
        }
        LogExporterKind::Console => {
            builder.with_simple_exporter(opentelemetry_stdout::LogExporter::default())
        }
    };

    Ok(builder.build())
}

/// Install the process-wide subscriber. Fails if one is already set.
pub fn init_subscriber(
    selection: &ExporterSelection,
    tracer_provider: &SdkTracerProvider,
    logger_provider: &SdkLoggerProvider,
    log_level: &str,
) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let fmt = (selection.logs == LogExporterKind::Otlp).then(tracing_subscriber::fmt::layer);
    let spans = tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer(INSTRUMENTATION_NAME));
    let bridge = OpenTelemetryTracingBridge::new(logger_provider).with_filter(EnvFilter::new(BRIDGE_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt)
        .with(spans)
        .with(bridge)
        .try_init()?;

    Ok(())
}
