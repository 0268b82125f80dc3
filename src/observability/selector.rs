//! Exporter selection.
//!
//! Each signal has a fixed set of exporters. A config string is matched
//! case-insensitively against the signal's table; anything not in the table
//! resolves to the table's default without an error.

use crate::config::ServiceConfig;

/// A choice made from a string config value.
pub trait ConfigChoice: Copy + PartialEq + Sized + 'static {
    /// Accepted values (lower case) and the variant each one selects.
    const TABLE: &'static [(&'static str, Self)];

    /// Variant used for unknown or empty values.
    const DEFAULT: Self;

    fn from_config_value(value: &str) -> Self {
        let value = value.trim().to_ascii_lowercase();
        Self::TABLE
            .iter()
            .find(|(name, _)| *name == value)
            .map(|(_, choice)| *choice)
            .unwrap_or(Self::DEFAULT)
    }

    fn as_str(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, choice)| *choice == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsExporterKind {
    Console,
    Otlp,
    Prometheus,
}

impl ConfigChoice for MetricsExporterKind {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("console", Self::Console),
        ("otlp", Self::Otlp),
        ("prometheus", Self::Prometheus),
    ];
    const DEFAULT: Self = Self::Console;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingExporterKind {
    Console,
    Otlp,
    Zipkin,
}

impl ConfigChoice for TracingExporterKind {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("console", Self::Console),
        ("otlp", Self::Otlp),
        ("zipkin", Self::Zipkin),
    ];
    const DEFAULT: Self = Self::Console;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogExporterKind {
    Console,
    Otlp,
}

impl ConfigChoice for LogExporterKind {
    const TABLE: &'static [(&'static str, Self)] = &[("console", Self::Console), ("otlp", Self::Otlp)];
    const DEFAULT: Self = Self::Console;
}

/// Bucketing applied to every histogram instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistogramAggregation {
    /// SDK default explicit bucket boundaries.
    Explicit,
    /// Base-2 exponential buckets.
    Exponential,
}

impl ConfigChoice for HistogramAggregation {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("explicit", Self::Explicit),
        ("exponential", Self::Exponential),
    ];
    const DEFAULT: Self = Self::Explicit;
}

/// The exporters and aggregation resolved from configuration at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExporterSelection {
    pub metrics: MetricsExporterKind,
    pub tracing: TracingExporterKind,
    pub logs: LogExporterKind,
    pub histogram: HistogramAggregation,
}

impl ExporterSelection {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            metrics: MetricsExporterKind::from_config_value(&config.use_metrics_exporter),
            tracing: TracingExporterKind::from_config_value(&config.use_tracing_exporter),
            logs: LogExporterKind::from_config_value(&config.use_log_exporter),
            histogram: HistogramAggregation::from_config_value(&config.histogram_aggregation),
        }
    }

    /// Whether any signal ships to the OTLP collector.
    pub fn uses_otlp(&self) -> bool {
        self.metrics == MetricsExporterKind::Otlp
            || self.tracing == TracingExporterKind::Otlp
            || self.logs == LogExporterKind::Otlp
    }

    /// Whether the HTTP server should serve a Prometheus scrape endpoint.
    pub fn serves_prometheus(&self) -> bool {
        self.metrics == MetricsExporterKind::Prometheus
    }
}

impl Default for ExporterSelection {
    fn default() -> Self {
        Self {
            metrics: MetricsExporterKind::DEFAULT,
            tracing: TracingExporterKind::DEFAULT,
            logs: LogExporterKind::DEFAULT,
            histogram: HistogramAggregation::DEFAULT,
        }
    }
}
