//! Weather telemetry demo service.
//!
//! A small Axum service wired to the OpenTelemetry SDK.
//!
//! # Architecture Overview
//!
//! ```text
//!   appsettings.toml ──▶ config ──▶ selector ──┬──▶ meter provider ──▶ console | otlp | prometheus
//!                                               ├──▶ tracer provider ─▶ console | otlp | zipkin
//!                                               └──▶ logger provider ─▶ console | otlp
//!
//!   Client ──▶ http server ──▶ GET /               ──▶ GET /hello (self-call, trace propagated)
//!                          ──▶ GET /increase-days  ──▶ weather.days.freezing += 1
//!                          ──▶ GET /hello
//!                          ──▶ GET /metrics        (prometheus only)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use weather_telemetry::config::{load_layered, ServiceConfig};
use weather_telemetry::lifecycle::{signals, Shutdown};
use weather_telemetry::observability::instrumentation::INSTRUMENTATION_NAME;
use weather_telemetry::observability::logging::events;
use weather_telemetry::{HttpServer, Telemetry};

#[derive(Parser)]
#[command(name = "weather-telemetry")]
#[command(about = "Demo web service exporting metrics, traces and logs via OpenTelemetry", long_about = None)]
struct Cli {
    /// Base settings file.
    #[arg(short, long, default_value = "config/appsettings.toml")]
    config: PathBuf,

    /// Optional overlay applied on top of the base settings.
    #[arg(long, default_value = "config/appsettings.custom.toml")]
    custom_config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, loaded_from_file) = if cli.config.exists() {
        (load_layered(&cli.config, Some(&cli.custom_config))?, true)
    } else {
        (ServiceConfig::default(), false)
    };

    let telemetry = Telemetry::init(&config)?;
    telemetry.install_subscriber(&config.log_level)?;

    tracing::info!(
        event_id = events::SERVICE_STARTING,
        meter = INSTRUMENTATION_NAME,
        "weather-telemetry v{} starting",
        env!("CARGO_PKG_VERSION")
    );
    if loaded_from_file {
        tracing::info!(
            event_id = events::CONFIG_LOADED,
            path = %cli.config.display(),
            bind_address = %config.listener.bind_address,
            request_timeout_secs = config.timeouts.request_secs,
            "Configuration loaded"
        );
    } else {
        tracing::warn!(
            event_id = events::CONFIG_LOADED,
            path = %cli.config.display(),
            "Configuration file not found, using defaults"
        );
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.signalled();
    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, &telemetry);
    server.run(listener, server_shutdown).await?;

    tracing::info!(event_id = events::SHUTDOWN, "Flushing telemetry");
    if let Err(e) = telemetry.shutdown() {
        eprintln!("telemetry shutdown failed: {e}");
    }

    Ok(())
}
