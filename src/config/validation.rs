//! Configuration validation.
//!
//! Serde handles the syntax; this checks values that serde accepts but the
//! service cannot run with. Endpoints are only checked for exporters that are
//! actually selected, and all problems are reported at once.
//!
//! Exporter kind strings are never rejected here: unknown kinds fall back to
//! the console exporter.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;
use crate::observability::selector::{ExporterSelection, MetricsExporterKind, TracingExporterKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("service name must not be empty")]
    EmptyServiceName,

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("{field} is not a valid http(s) URL: '{value}'")]
    Url { field: &'static str, value: String },
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.service_name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "Timeouts.RequestSecs" });
    }
    if config.timeouts.self_call_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "Timeouts.SelfCallSecs" });
    }

    let selection = ExporterSelection::from_config(config);
    if selection.uses_otlp() {
        check_url(&mut errors, "Otlp.Endpoint", &config.otlp.endpoint);
    }
    if selection.tracing == TracingExporterKind::Zipkin {
        check_url(&mut errors, "Zipkin.Endpoint", &config.zipkin.endpoint);
    }
    if selection.metrics == MetricsExporterKind::Console && config.console.export_interval_ms == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "Console.ExportIntervalMs" });
    }

    if let Some(base_url) = &config.self_call.base_url {
        check_url(&mut errors, "SelfCall.BaseUrl", base_url);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::Url {
            field,
            value: value.to_string(),
        });
    }
}
