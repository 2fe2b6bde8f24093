//! Tracing and APM Setup
//!
//! Initializes tracing-subscriber with OpenTelemetry for Datadog APM, with
//! the SQL span classifier registered ahead of the exporter.

use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use opentelemetry_sdk::trace::{Sampler, TracerProvider};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::classify::SqlSpanClassifier;
use crate::config::DatadogConfig;

/// Instrumentation scope name for spans created through `tracing`
pub const TRACER_NAME: &str = "otel-dbm";

/// W3C `traceparent`/`tracestate` plus `baggage` headers
pub fn propagator() -> TextMapCompositePropagator {
    TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ])
}

/// Diagnostic fmt layer, JSON when `logs_injection` is set
pub fn fmt_layer<S, W>(config: &DatadogConfig, make_writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer().with_writer(make_writer);
    if config.logs_injection {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Initialize the complete observability stack
///
/// Sets up:
/// - OpenTelemetry with Datadog exporter for distributed tracing
/// - `SqlSpanClassifier` tagging database spans at start
/// - tracing-subscriber with environment-based filtering, writing to stderr
///   so stdout stays free for application JSON Lines
pub fn init(config: &DatadogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Set global propagator for distributed tracing context
    opentelemetry::global::set_text_map_propagator(propagator());

    let exporter = opentelemetry_datadog::new_pipeline()
        .with_service_name(&config.service_name)
        .with_agent_endpoint(&config.trace_addr)
        .build_exporter()?;

    let trace_config = opentelemetry_sdk::trace::Config::default()
        .with_sampler(Sampler::TraceIdRatioBased(config.trace_sample_rate))
        .with_resource(opentelemetry_sdk::Resource::new(vec![
            opentelemetry::KeyValue::new("service.name", config.service_name.clone()),
            opentelemetry::KeyValue::new("service.version", config.version.clone()),
            opentelemetry::KeyValue::new(
                "deployment.environment",
                config.environment().to_string(),
            ),
        ]));

    // Processors run in registration order: classify before export
    let provider = TracerProvider::builder()
        .with_config(trace_config)
        .with_span_processor(SqlSpanClassifier::new())
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .build();
    let tracer = provider.tracer(TRACER_NAME);
    opentelemetry::global::set_tracer_provider(provider);

    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    // Environment filter for log levels
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Note: fmt layer goes before otel layer so spans are logged before being exported
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(config, std::io::stderr))
        .with(otel_layer)
        .try_init()?;

    tracing::info!(
        service = %config.service_name,
        env = %config.environment(),
        version = %config.version,
        sample_rate = %config.trace_sample_rate,
        "Datadog observability initialized"
    );

    Ok(())
}

/// Shutdown tracing gracefully
///
/// Flushes any pending spans to the Datadog agent.
/// Should be called before application exit.
pub fn shutdown() {
    tracing::info!("Shutting down Datadog tracing...");
    opentelemetry::global::shutdown_tracer_provider();
}
