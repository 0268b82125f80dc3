//! Custom instrumentation owned by the service.

use opentelemetry::metrics::{Counter, MeterProvider as _};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::InstrumentationScope;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};

/// Scope name of the service's meter and tracer.
pub const INSTRUMENTATION_NAME: &str = "weather-telemetry";

pub const FREEZING_DAYS_COUNTER: &str = "weather.days.freezing";
const FREEZING_DAYS_DESCRIPTION: &str = "The number of days where the temperature is below freezing";

/// The service's trace source and its freezing-days counter.
///
/// Built once at startup and handed to request handlers through the
/// application state. Both handles stay valid for as long as the providers
/// they came from; dropping the last provider flushes and releases them.
#[derive(Clone)]
pub struct Instrumentation {
    tracer: SdkTracer,
    freezing_days: Counter<u64>,
}

impl Instrumentation {
    pub fn new(meter_provider: &SdkMeterProvider, tracer_provider: &SdkTracerProvider) -> Self {
        let scope = InstrumentationScope::builder(INSTRUMENTATION_NAME)
            .with_version(env!("CARGO_PKG_VERSION"))
            .build();

        let meter = meter_provider.meter_with_scope(scope.clone());
        let freezing_days = meter
            .u64_counter(FREEZING_DAYS_COUNTER)
            .with_description(FREEZING_DAYS_DESCRIPTION)
            .build();

        Self {
            tracer: tracer_provider.tracer_with_scope(scope),
            freezing_days,
        }
    }

    /// Tracer used for spans the service starts itself.
    pub fn tracer(&self) -> &SdkTracer {
        &self.tracer
    }

    /// Add `count` days to the freezing-days counter.
    pub fn add_days(&self, count: u64) {
        self.freezing_days.add(count, &[]);
    }
}
