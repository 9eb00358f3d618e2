//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── storage: AzureBlobConfig   # Account, endpoint, service version
//! ├── count: CountConfig          # Page size, overall timeout
//! ├── auth: AuthConfig            # Credential source
//! └── telemetry: TelemetryConfig  # Log level and format
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//!
//! # Example
//!
//! ```bash
//! azcount --storage-account myaccount --page-size 500 --timeout 10000
//!
//! AZURE_STORAGE_ACCOUNT=myaccount AZCOUNT_TIMEOUT_MS=10000 azcount
//! ```

mod auth;
mod count;
mod telemetry;

use std::process;

use anyhow::Context;
pub use auth::AuthConfig;
use azcount_azblob::AzureBlobConfig;
use clap::Parser;
pub use count::CountConfig;
use serde::{Deserialize, Serialize};
pub use telemetry::{LogFormat, TelemetryConfig};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "azcount")]
#[command(about = "Counts the containers in an Azure storage account")]
#[command(version)]
pub struct Cli {
    /// Storage account and endpoint.
    #[clap(flatten)]
    pub storage: AzureBlobConfig,

    /// Page size and overall timeout.
    #[clap(flatten)]
    pub count: CountConfig,

    /// Credential source.
    #[clap(flatten)]
    pub auth: AuthConfig,

    /// Logging options.
    #[clap(flatten)]
    pub telemetry: TelemetryConfig,
}

impl Cli {
    /// Loads environment variables from a .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.storage
            .validate()
            .context("invalid storage configuration")?;
        self.count
            .validate()
            .context("invalid count configuration")?;
        Ok(())
    }

    /// Logs configuration (no secrets).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            account = %self.storage.account_name,
            endpoint = ?self.storage.endpoint.as_ref().map(|url| url.as_str()),
            api_version = %self.storage.api_version,
            "Storage configuration"
        );

        self.count.log();
        self.auth.log();
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
