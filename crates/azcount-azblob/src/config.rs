//! Azure Blob Storage client configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Service version sent as `x-ms-version`.
pub const DEFAULT_API_VERSION: &str = "2023-11-03";

/// Azure Blob Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct AzureBlobConfig {
    /// Name of the storage account whose containers are listed.
    #[cfg_attr(
        feature = "config",
        arg(short = 's', long = "storage-account", env = "AZURE_STORAGE_ACCOUNT")
    )]
    pub account_name: String,

    /// Blob service endpoint, overriding `https://<account>.blob.core.windows.net/`.
    ///
    /// Useful for sovereign clouds and local emulators.
    #[cfg_attr(
        feature = "config",
        arg(long = "endpoint", env = "AZURE_STORAGE_ENDPOINT")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Url>,

    /// Storage service version sent with every request.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "api-version",
            env = "AZURE_STORAGE_API_VERSION",
            default_value = DEFAULT_API_VERSION
        )
    )]
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// User-Agent header sent with every request.
    #[cfg_attr(feature = "config", arg(skip))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_owned()
}

impl AzureBlobConfig {
    /// Creates a configuration for the given storage account.
    pub fn new(account_name: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            endpoint: None,
            api_version: default_api_version(),
            user_agent: None,
        }
    }

    /// Sets a custom service endpoint.
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets the service version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidInput`](azcount_core::ErrorKind::InvalidInput)
    /// error for an empty account name, and a
    /// [`Configuration`](azcount_core::ErrorKind::Configuration) error for an
    /// unusable endpoint or API version.
    pub fn validate(&self) -> Result<()> {
        if self.account_name.trim().is_empty() {
            return Err(Error::invalid_input().with_message("storage account name is required"));
        }

        if self.api_version.trim().is_empty() {
            return Err(Error::configuration().with_message("API version must not be empty"));
        }

        if let Some(endpoint) = &self.endpoint
            && !matches!(endpoint.scheme(), "http" | "https")
        {
            return Err(Error::configuration().with_message(format!(
                "endpoint '{endpoint}' must use http or https"
            )));
        }

        Ok(())
    }

    /// Returns the blob service URL used for listing requests.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the account name does not form a
    /// valid host name.
    pub fn service_url(&self) -> Result<Url> {
        if let Some(endpoint) = &self.endpoint {
            let mut url = endpoint.clone();
            if !url.path().ends_with('/') {
                let path = format!("{}/", url.path());
                url.set_path(&path);
            }
            url.set_query(None);
            return Ok(url);
        }

        let account = self.account_name.trim();
        Url::parse(&format!("https://{account}.blob.core.windows.net/")).map_err(|e| {
            Error::configuration()
                .with_message(format!("invalid storage account name '{account}'"))
                .with_source(e)
        })
    }

    /// Returns the effective user agent.
    pub fn effective_user_agent(&self) -> String {
        match &self.user_agent {
            Some(user_agent) if !user_agent.is_empty() => user_agent.clone(),
            _ => format!("azcount/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
