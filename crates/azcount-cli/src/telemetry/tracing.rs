//! Tracing initialization and configuration.

use std::io;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, TelemetryConfig};

/// Initializes the tracing subscriber for structured logging.
///
/// Events are written to stderr, leaving stdout for the count. The filter
/// comes from `RUST_LOG`, falling back to `--log-level`.
///
/// ```bash
/// RUST_LOG=debug azcount -s myaccount
/// RUST_LOG=azcount_core=trace,azcount_azblob=debug azcount -s myaccount
/// ```
///
/// # Errors
///
/// Returns an error if the filter is invalid or a subscriber is already set.
pub(super) fn init_tracing(config: &TelemetryConfig) -> anyhow::Result<()> {
    let env_filter = create_env_filter(&config.log_level)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.log_format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_level(true)
                    .with_ansi(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))
}

/// Creates an environment filter for tracing.
fn create_env_filter(default_level: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {e}"))
}
