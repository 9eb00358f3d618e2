//! Reqwest-based Blob service client.

use std::sync::Arc;

use azcount_core::{ContainerPager, ListOptions, ListingProvider};
use reqwest::Client;
use url::Url;

use crate::Result;
use crate::auth::{Authenticator, Credential, SharedKeySigner};
use crate::config::AzureBlobConfig;
use crate::pager::AzureBlobPager;

/// Tracing target for client operations.
pub const TRACING_TARGET: &str = "azcount_azblob::client";

/// How requests are authorized, prepared once from the [`Credential`].
#[derive(Debug)]
pub(crate) enum Authorization {
    SharedKey(SharedKeySigner),
    Sas(Vec<(String, String)>),
    Bearer(String),
    Anonymous,
}

impl Authorization {
    fn from_credential(credential: Credential) -> Result<Self> {
        Ok(match credential {
            Credential::SharedKey { account, key } => {
                Self::SharedKey(SharedKeySigner::new(account, &key)?)
            }
            Credential::Sas(token) => Self::Sas(
                url::form_urlencoded::parse(token.trim().trim_start_matches('?').as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            ),
            Credential::Bearer(token) => Self::Bearer(token),
            Credential::Anonymous => Self::Anonymous,
        })
    }
}

/// Inner client that holds the HTTP client and configuration.
#[derive(Debug)]
pub(crate) struct AzureBlobClientInner {
    pub(crate) http: Client,
    pub(crate) config: AzureBlobConfig,
    pub(crate) service_url: Url,
    pub(crate) authorization: Authorization,
}

/// Azure Blob Storage client for listing containers.
///
/// Implements [`ListingProvider`]: every pager it creates walks the
/// `List Containers` operation of one storage account.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
/// use azcount_azblob::{AzureBlobClient, AzureBlobConfig, EnvironmentAuthenticator};
/// use azcount_core::PagedCounter;
///
/// let config = AzureBlobConfig::new("myaccount");
/// let auth = EnvironmentAuthenticator::new("myaccount");
/// let client = AzureBlobClient::authenticate(config, &auth).await?;
///
/// let counter = PagedCounter::new(client, 100, Duration::from_secs(5))?;
/// println!("{} containers found.", counter.count().await?);
/// ```
#[derive(Clone, Debug)]
pub struct AzureBlobClient {
    inner: Arc<AzureBlobClientInner>,
}

impl AzureBlobClient {
    /// Creates a client from a configuration and an already acquired credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the credential is
    /// unusable, or the HTTP client cannot be created.
    pub fn new(config: AzureBlobConfig, credential: Credential) -> Result<Self> {
        config.validate()?;
        let service_url = config.service_url()?;

        tracing::debug!(
            target: TRACING_TARGET,
            account = %config.account_name,
            endpoint = %service_url,
            api_version = %config.api_version,
            credential = credential.kind(),
            "Creating blob client"
        );

        let authorization = Authorization::from_credential(credential)?;

        let http = Client::builder()
            .user_agent(config.effective_user_agent())
            .build()
            .map_err(crate::error::Error::from)?;

        let inner = AzureBlobClientInner {
            http,
            config,
            service_url,
            authorization,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Acquires a credential from `authenticator` and creates the client.
    ///
    /// # Errors
    ///
    /// Returns the authenticator's error, or any error from [`Self::new`].
    pub async fn authenticate<A>(config: AzureBlobConfig, authenticator: &A) -> Result<Self>
    where
        A: Authenticator + ?Sized,
    {
        config.validate()?;
        let credential = authenticator.acquire_credential().await?;

        tracing::info!(
            target: TRACING_TARGET,
            account = %config.account_name,
            credential = credential.kind(),
            "Acquired storage credential"
        );

        Self::new(config, credential)
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &AzureBlobConfig {
        &self.inner.config
    }

    /// Blob service URL listing requests are sent to.
    pub fn service_url(&self) -> &Url {
        &self.inner.service_url
    }

    /// Creates a pager with concrete type, for callers that need it.
    pub fn pager(&self, options: ListOptions) -> AzureBlobPager {
        AzureBlobPager::new(Arc::clone(&self.inner), options)
    }
}

impl ListingProvider for AzureBlobClient {
    fn create_pager(&self, options: ListOptions) -> Box<dyn ContainerPager> {
        Box::new(self.pager(options))
    }
}
