//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! Keys are PascalCase so existing settings files carry over unchanged
//! (`UseMetricsExporter`, `[Otlp] Endpoint`, ...).

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ServiceConfig {
    /// Reported as the `service.name` resource attribute.
    pub service_name: String,

    /// Metrics exporter: console, otlp or prometheus.
    pub use_metrics_exporter: String,

    /// Tracing exporter: console, otlp or zipkin.
    pub use_tracing_exporter: String,

    /// Log exporter: console or otlp.
    pub use_log_exporter: String,

    /// Histogram aggregation: explicit or exponential.
    pub histogram_aggregation: String,

    /// Default log filter when `RUST_LOG` is not set.
    pub log_level: String,

    /// OTLP collector settings, shared by all three signals.
    pub otlp: OtlpConfig,

    /// Zipkin collector settings.
    pub zipkin: ZipkinConfig,

    /// Console exporter settings.
    pub console: ConsoleConfig,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Target of the `GET /` self-call.
    pub self_call: SelfCallConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: "otel-test".to_string(),
            use_metrics_exporter: "console".to_string(),
            use_tracing_exporter: "console".to_string(),
            use_log_exporter: "console".to_string(),
            histogram_aggregation: "explicit".to_string(),
            log_level: "info".to_string(),
            otlp: OtlpConfig::default(),
            zipkin: ZipkinConfig::default(),
            console: ConsoleConfig::default(),
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            self_call: SelfCallConfig::default(),
        }
    }
}

/// OTLP exporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct OtlpConfig {
    /// gRPC endpoint of the collector.
    pub endpoint: String,
}

impl Default for OtlpConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4317".to_string(),
        }
    }
}

/// Zipkin exporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ZipkinConfig {
    /// Span collection endpoint.
    pub endpoint: String,
}

impl Default for ZipkinConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9411/api/v2/spans".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ConsoleConfig {
    /// How often the console metrics exporter prints, in milliseconds.
    pub export_interval_ms: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            export_interval_ms: 5000,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Deadline for the outbound call made by `GET /`, in seconds.
    pub self_call_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            self_call_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SelfCallConfig {
    /// Base URL the service calls itself on. When unset, the bound listener
    /// address is used.
    pub base_url: Option<String>,
}
