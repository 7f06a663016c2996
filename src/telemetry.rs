use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    trace::{Sampler, SdkTracerProvider},
    Resource,
};
use std::env;
use tracing::{error, info};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info,aws_config=warn,aws_smithy_runtime=warn,hyper=warn,reqwest=warn";

// The ADOT collector extension listens on 127.0.0.1 inside Lambda
const LAMBDA_COLLECTOR: &str = "http://127.0.0.1:4318/v1/traces";
const LOCAL_COLLECTOR: &str = "http://localhost:4318/v1/traces";

/// Tracing options resolved from the function's environment
#[derive(Debug, Clone, PartialEq)]
struct TelemetrySettings {
    service_name: String,
    environment: String,
    otel_endpoint: Option<String>,
    sampling_rate: f64,
}

impl TelemetrySettings {
    fn from_lookup<F>(default_service_name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_lambda = lookup("AWS_LAMBDA_FUNCTION_NAME").is_some();
        let enable_otel = lookup("OTEL_ENABLED")
            .map(|v| v == "true")
            .unwrap_or(is_lambda);

        let otel_endpoint = enable_otel.then(|| {
            if is_lambda {
                LAMBDA_COLLECTOR.to_string()
            } else {
                lookup("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or_else(|| LOCAL_COLLECTOR.to_string())
            }
        });

        Self {
            service_name: lookup("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| default_service_name.to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            otel_endpoint,
            // 1% unless configured
            sampling_rate: lookup("OTEL_TRACE_SAMPLING_RATE")
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(0.01)
                .clamp(0.0, 1.0),
        }
    }
}

/// Span timings go to the log only when no trace exporter records them
fn span_events(exporting: bool) -> FmtSpan {
    if exporting {
        FmtSpan::NONE
    } else {
        FmtSpan::CLOSE
    }
}

/// Install the global subscriber: JSON logs for CloudWatch, plus an OTLP
/// span exporter when OTEL_ENABLED is true (the default inside Lambda).
///
/// A collector that cannot be set up is logged and the function carries on
/// with logs only.
pub fn init_tracing(default_service_name: &str) {
    let settings = TelemetrySettings::from_lookup(default_service_name, |key| env::var(key).ok());

    let (otel_layer, otel_error) = match settings.otel_endpoint.as_deref() {
        Some(endpoint) => match init_opentelemetry(endpoint, &settings) {
            Ok(provider) => {
                opentelemetry::global::set_tracer_provider(provider.clone());
                let tracer = provider.tracer(settings.service_name.clone());
                (Some(OpenTelemetryLayer::new(tracer)), None)
            }
            Err(e) => (None, Some(e.to_string())),
        },
        None => (None, None),
    };
    let exporting = otel_layer.is_some();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .with(otel_layer)
        .with(
            fmt::layer()
                .json()
                .with_target(false)
                .with_current_span(true)
                .with_span_events(span_events(exporting)),
        )
        .init();

    if let Some(e) = otel_error {
        error!("Failed to initialize OpenTelemetry: {}. Continuing with logs only.", e);
    } else if exporting {
        info!(
            endpoint = settings.otel_endpoint.as_deref().unwrap_or_default(),
            sampling_rate = settings.sampling_rate,
            "OpenTelemetry enabled"
        );
    }
}

fn init_opentelemetry(
    endpoint: &str,
    settings: &TelemetrySettings,
) -> Result<SdkTracerProvider, Box<dyn std::error::Error>> {
    let resource = Resource::builder()
        .with_attribute(KeyValue::new("service.name", settings.service_name.clone()))
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .with_attribute(KeyValue::new("deployment.environment", settings.environment.clone()))
        .build();

    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_sampler(Sampler::TraceIdRatioBased(settings.sampling_rate))
        .with_batch_exporter(exporter)
        .build())
}
