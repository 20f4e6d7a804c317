use std::io::IsTerminal;

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{self as sdk, Resource};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_FILTER: &str = "warn,peoplepulse=info,platform_authn=info";

/// Configuration for tracing initialization.
#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    pub env_filter: Option<String>,
    pub otlp_endpoint: Option<String>,
    /// Colored output; off when stderr is redirected to a file.
    pub ansi: bool,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: "peoplepulse",
            env_filter: None,
            otlp_endpoint: None,
            ansi: std::io::stderr().is_terminal(),
        }
    }
}

impl ObsConfig {
    /// Raise verbosity from repeated `-v` flags. An explicit filter wins.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        if self.env_filter.is_none() {
            self.env_filter = match verbose {
                0 => None,
                1 => Some("info".to_string()),
                2 => Some("debug".to_string()),
                _ => Some("trace".to_string()),
            };
        }
        self
    }
}

fn resolve_filter(explicit: Option<String>, from_env: Option<String>) -> String {
    explicit
        .or(from_env)
        .filter(|filter| !filter.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Keeps the OTLP pipeline alive. Dropping it flushes buffered spans and
/// stops the exporter, so hold it until the process is about to exit.
#[must_use = "dropping the guard shuts the span exporter down"]
#[derive(Debug, Default)]
pub struct TracingGuard {
    provider: Option<sdk::trace::SdkTracerProvider>,
}

impl TracingGuard {
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(err) = provider.shutdown() {
                tracing::warn!(error = %err, "trace exporter did not shut down cleanly");
            }
        }
    }
}

/// Install tracing subscribers with optional OTLP exporter. Logs go to stderr
/// so that rendered pages on stdout stay clean.
///
/// Only the first call installs anything; later calls return an inert guard.
pub fn init_tracing(config: ObsConfig) -> Result<TracingGuard> {
    if INIT.get().is_some() {
        return Ok(TracingGuard::default());
    }

    let filter = resolve_filter(config.env_filter, std::env::var("RUST_LOG").ok());
    let env_filter = EnvFilter::try_new(filter)?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_target(false);
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    let otlp_endpoint = config
        .otlp_endpoint
        .or_else(|| std::env::var("OTLP_ENDPOINT").ok());

    let mut guard = TracingGuard::default();
    if let Some(endpoint) = otlp_endpoint {
        let exporter = SpanExporter::builder()
            .with_http()
            .with_protocol(Protocol::HttpBinary)
            .with_endpoint(endpoint)
            .build()?;

        let resource = Resource::builder()
            .with_service_name(config.service_name)
            .build();

        let provider = sdk::trace::SdkTracerProvider::builder()
            .with_resource(resource)
            .with_batch_exporter(exporter)
            .build();
        let tracer = provider.tracer(config.service_name);

        registry
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .try_init()?;
        guard.provider = Some(provider);
    } else {
        registry.try_init()?;
    }

    INIT.set(())
        .map_err(|_| anyhow!("tracing already initialized"))?;
    Ok(guard)
}
