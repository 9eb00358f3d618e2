//! Logging configuration.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging options. Logs always go to stderr so stdout carries only the result.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default log filter, used when `RUST_LOG` is not set.
    #[arg(long = "log-level", env = "AZCOUNT_LOG_LEVEL", default_value = "warn")]
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format.
    #[arg(
        long = "log-format",
        env = "AZCOUNT_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_owned()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}
