//! Listing walk configuration.

use std::time::Duration;

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Largest page the Blob service accepts for `List Containers`.
pub const MAX_PAGE_SIZE: u32 = 5000;

/// Settings for one count operation.
///
/// # Environment Variables
///
/// - `AZCOUNT_PAGE_SIZE` - Containers requested per page (default: 100, valid range: 1-5000)
/// - `AZCOUNT_TIMEOUT_MS` - Budget for the whole listing in milliseconds (default: 5000)
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct CountConfig {
    /// Number of containers requested per page.
    ///
    /// The service may return fewer. Larger pages mean fewer round trips.
    #[arg(
        short = 'p',
        long = "page-size",
        env = "AZCOUNT_PAGE_SIZE",
        default_value_t = 100
    )]
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Timeout in milliseconds for the whole listing, not for each page.
    #[arg(
        short = 't',
        long = "timeout",
        env = "AZCOUNT_TIMEOUT_MS",
        default_value_t = 5000
    )]
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_page_size() -> u32 {
    100
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl CountConfig {
    /// Validates page size and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the page size is outside 1-5000 or the timeout is zero.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(anyhow!(
                "Page size {} is invalid. Must be between 1 and {MAX_PAGE_SIZE}.",
                self.page_size
            ));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow!("Timeout must be at least 1 millisecond."));
        }

        Ok(())
    }

    /// Returns the listing timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Logs the count settings.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            page_size = self.page_size,
            timeout_ms = self.timeout_ms,
            "Count configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config() {
        let config = CountConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn reject_invalid_page_sizes() {
        let with_page_size = |page_size| CountConfig {
            page_size,
            ..Default::default()
        };

        assert!(with_page_size(0).validate().is_err());
        assert!(with_page_size(MAX_PAGE_SIZE + 1).validate().is_err());
        assert!(with_page_size(MAX_PAGE_SIZE).validate().is_ok());
        assert!(with_page_size(1).validate().is_ok());
    }

    #[test]
    fn reject_zero_timeout() {
        let config = CountConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
