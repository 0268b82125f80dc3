//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceConfig
//!     → selector.rs (one exporter per signal + histogram aggregation)
//!     → metrics.rs / traces.rs / logging.rs (SDK providers)
//!     → Telemetry (owns the providers until shutdown)
//!
//! Producers:
//!     → instrumentation.rs (freezing-days counter, service tracer)
//!     → http middleware (request spans, request durations)
//!     → tracing macros (log events via the OpenTelemetry bridge)
//!
//! Exporters:
//!     → console (stdout), OTLP/gRPC, Prometheus scrape, Zipkin
//! ```
//!
//! # Design Decisions
//! - Exporter choice is made once at startup and never changes
//! - Unknown exporter names fall back to the console exporter
//! - Handlers receive instrumentation through application state, not globals

pub mod instrumentation;
pub mod logging;
pub mod metrics;
pub mod selector;
pub mod traces;

use opentelemetry::KeyValue;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use prometheus::Registry;
use thiserror::Error;
use uuid::Uuid;

use crate::config::ServiceConfig;

pub use instrumentation::Instrumentation;
pub use metrics::HttpMetrics;
pub use selector::{
    ConfigChoice, ExporterSelection, HistogramAggregation, LogExporterKind, MetricsExporterKind,
    TracingExporterKind,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build {signal} exporter: {source}")]
    Exporter {
        signal: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("failed to build histogram view: {0}")]
    View(String),

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to shut down {signal} provider: {reason}")]
    Shutdown { signal: &'static str, reason: String },
}

impl TelemetryError {
    pub(crate) fn exporter<E>(signal: &'static str) -> impl FnOnce(E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |source| Self::Exporter {
            signal,
            source: Box::new(source),
        }
    }
}

/// The configured telemetry pipeline.
pub struct Telemetry {
    service_name: String,
    selection: ExporterSelection,
    meter_provider: SdkMeterProvider,
    tracer_provider: SdkTracerProvider,
    logger_provider: SdkLoggerProvider,
    prometheus: Option<Registry>,
}

impl Telemetry {
    /// Build providers for the exporters selected by `config`.
    ///
    /// Nothing is installed globally; see [`Telemetry::install_subscriber`].
    pub fn init(config: &ServiceConfig) -> Result<Self, TelemetryError> {
        let selection = ExporterSelection::from_config(config);
        let resource = build_resource(&config.service_name);

        let meters = metrics::build_meter_provider(&selection, config, resource.clone())?;
        let tracer_provider = traces::build_tracer_provider(&selection, config, resource.clone())?;
        let logger_provider = logging::build_logger_provider(&selection, config, resource)?;

        Ok(Self {
            service_name: config.service_name.clone(),
            selection,
            meter_provider: meters.provider,
            tracer_provider,
            logger_provider,
            prometheus: meters.registry,
        })
    }

    pub fn selection(&self) -> ExporterSelection {
        self.selection
    }

    pub fn instrumentation(&self) -> Instrumentation {
        Instrumentation::new(&self.meter_provider, &self.tracer_provider)
    }

    pub fn http_metrics(&self) -> HttpMetrics {
        HttpMetrics::new(&self.meter_provider)
    }

    /// Registry behind the scrape endpoint; only set for the Prometheus exporter.
    pub fn prometheus_registry(&self) -> Option<&Registry> {
        self.prometheus.as_ref()
    }

    /// Install the global `tracing` subscriber and register the providers as
    /// the process-wide defaults for libraries using the global API.
    ///
    /// The resolved exporters are logged once the subscriber is in place.
    pub fn install_subscriber(&self, log_level: &str) -> Result<(), TelemetryError> {
        logging::init_subscriber(&self.selection, &self.tracer_provider, &self.logger_provider, log_level)?;
        opentelemetry::global::set_tracer_provider(self.tracer_provider.clone());
        opentelemetry::global::set_meter_provider(self.meter_provider.clone());
        self.log_selection();
        Ok(())
    }

    /// Unknown exporter names fall back silently, so this line is where a
    /// typo in the config becomes visible.
    pub fn log_selection(&self) {
        tracing::info!(
            event_id = logging::events::TELEMETRY_CONFIGURED,
            service_name = %self.service_name,
            metrics = self.selection.metrics.as_str(),
            tracing = self.selection.tracing.as_str(),
            logs = self.selection.logs.as_str(),
            histogram = self.selection.histogram.as_str(),
            "Telemetry pipeline configured"
        );
    }

    /// Flush and shut down all providers. Every provider is shut down even
    /// if an earlier one fails; the first failure is returned.
    pub fn shutdown(self) -> Result<(), TelemetryError> {
        let results = [
            ("tracing", self.tracer_provider.shutdown().map_err(|e| e.to_string())),
            ("metrics", self.meter_provider.shutdown().map_err(|e| e.to_string())),
            ("logs", self.logger_provider.shutdown().map_err(|e| e.to_string())),
        ];

        results
            .into_iter()
            .find_map(|(signal, result)| result.err().map(|reason| TelemetryError::Shutdown { signal, reason }))
            .map_or(Ok(()), Err)
    }
}

fn build_resource(service_name: &str) -> Resource {
    Resource::builder()
        .with_service_name(service_name.to_string())
        .with_attributes([
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("service.instance.id", Uuid::new_v4().to_string()),
        ])
        .build()
}
