//! Credential acquisition for Blob service requests.
//!
//! An [`Authenticator`] is asked for a [`Credential`] once, when the client
//! is built. The listing code never talks to it again.

mod cli;
mod environment;
mod shared_key;

use std::fmt;

pub use cli::{AzureCliAuthenticator, STORAGE_RESOURCE};
pub use environment::{
    ENV_BEARER_TOKEN, ENV_SAS_TOKEN, ENV_STORAGE_KEY, EnvironmentAuthenticator,
};
pub(crate) use shared_key::SharedKeySigner;

use crate::Result;

/// Tracing target for credential acquisition.
pub const TRACING_TARGET: &str = "azcount_azblob::auth";

/// Proof of identity attached to every listing request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Account name and base64-encoded account key, signed per request.
    SharedKey {
        /// Storage account name.
        account: String,
        /// Base64-encoded account key.
        key: String,
    },
    /// Shared access signature, appended to the query string.
    Sas(String),
    /// OAuth bearer token for the `https://storage.azure.com/` resource.
    Bearer(String),
    /// No authorization, for public or emulated endpoints.
    Anonymous,
}

impl Credential {
    /// Returns a short name for the credential kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SharedKey { .. } => "shared_key",
            Self::Sas(_) => "sas",
            Self::Bearer(_) => "bearer",
            Self::Anonymous => "anonymous",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedKey { account, .. } => f
                .debug_struct("SharedKey")
                .field("account", account)
                .finish_non_exhaustive(),
            Self::Sas(_) => f.write_str("Sas(..)"),
            Self::Bearer(_) => f.write_str("Bearer(..)"),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// Produces request credentials.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// Acquires a credential for the storage account.
    async fn acquire_credential(&self) -> Result<Credential>;
}

/// Authenticator returning a fixed credential.
#[derive(Debug, Clone)]
pub struct StaticAuthenticator {
    credential: Credential,
}

impl StaticAuthenticator {
    /// Creates an authenticator that always returns `credential`.
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    /// Creates an authenticator for anonymous access.
    pub fn anonymous() -> Self {
        Self::new(Credential::Anonymous)
    }
}

#[async_trait::async_trait]
impl Authenticator for StaticAuthenticator {
    async fn acquire_credential(&self) -> Result<Credential> {
        Ok(self.credential.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_secrets() {
        let credential = Credential::SharedKey {
            account: "myaccount".into(),
            key: "c2VjcmV0".into(),
        };
        let debug = format!("{credential:?}");
        assert!(debug.contains("myaccount"));
        assert!(!debug.contains("c2VjcmV0"));

        let debug = format!("{:?}", Credential::Bearer("token-value".into()));
        assert!(!debug.contains("token-value"));
    }

    #[tokio::test]
    async fn static_authenticator_returns_its_credential() {
        let auth = StaticAuthenticator::new(Credential::Sas("sv=1&sig=abc".into()));
        let credential = auth.acquire_credential().await.unwrap();
        assert_eq!(credential.kind(), "sas");
    }
}
