//! Tracing subscriber setup shared by the ferry binaries.
//!
//! [`init`] installs a `fmt` layer filtered by an [`EnvFilter`] and, when an
//! OTLP endpoint is configured, an OpenTelemetry layer exporting spans over
//! gRPC.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};
use typed_builder::TypedBuilder;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(String),
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct TelemetryConfig {
    #[builder(default = "ferry".to_string(), setter(into))]
    pub service_name: String,
    /// Directive used when `RUST_LOG` is unset, e.g. `info` or `ferry_registry=debug`.
    #[builder(default = "info".to_string(), setter(into))]
    pub default_filter: String,
    #[builder(default)]
    pub format: LogFormat,
    /// gRPC collector endpoint, e.g. `http://localhost:4317`. Span export is off when `None`.
    #[builder(default)]
    pub otlp_endpoint: Option<String>,
}

/// Keeps the tracer provider alive; flushes pending spans on drop.
#[must_use = "dropping the guard shuts down span export"]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to shut down tracer provider: {e}");
            }
        }
    }
}

fn parse_filter(directive: &str) -> Result<EnvFilter> {
    Ok(EnvFilter::try_new(directive)?)
}

fn build_filter(default_directive: &str) -> Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directive) if !directive.is_empty() => parse_filter(&directive),
        _ => parse_filter(default_directive),
    }
}

fn build_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .build())
}

/// Installs the global tracing subscriber.
///
/// Must be called from within a Tokio runtime when `otlp_endpoint` is set.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard> {
    let filter = build_filter(&config.default_filter)?;

    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    };

    let provider = config
        .otlp_endpoint
        .as_deref()
        .map(|endpoint| build_provider(&config.service_name, endpoint))
        .transpose()?;
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(TelemetryGuard { provider })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = TelemetryConfig::builder().build();
        assert_eq!(config.service_name, "ferry");
        assert_eq!(config.default_filter, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn config_overrides() {
        let config = TelemetryConfig::builder()
            .service_name("ferry-gateway")
            .format(LogFormat::Json)
            .otlp_endpoint(Some("http://localhost:4317".to_string()))
            .build();
        assert_eq!(config.service_name, "ferry-gateway");
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://localhost:4317"));
    }

    #[test]
    fn filter_directives() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("ferry_registry=debug,tower_http=trace").is_ok());
        assert!(parse_filter("ferry_registry=loud").is_err());
    }
}
