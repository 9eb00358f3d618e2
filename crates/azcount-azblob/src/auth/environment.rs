//! Credential chain driven by environment variables.

use super::{Authenticator, AzureCliAuthenticator, Credential, TRACING_TARGET};
use crate::Result;

/// Account key used for Shared Key authorization.
pub const ENV_STORAGE_KEY: &str = "AZURE_STORAGE_KEY";
/// Shared access signature token.
pub const ENV_SAS_TOKEN: &str = "AZURE_STORAGE_SAS_TOKEN";
/// Pre-acquired OAuth bearer token.
pub const ENV_BEARER_TOKEN: &str = "AZURE_STORAGE_TOKEN";

/// Tries credentials from the environment in order, then falls back to the
/// Azure CLI:
///
/// 1. `AZURE_STORAGE_KEY` as a shared key for the configured account
/// 2. `AZURE_STORAGE_SAS_TOKEN`
/// 3. `AZURE_STORAGE_TOKEN` as a bearer token
/// 4. `az account get-access-token`
#[derive(Debug, Clone)]
pub struct EnvironmentAuthenticator {
    account_name: String,
    fallback: AzureCliAuthenticator,
}

impl EnvironmentAuthenticator {
    /// Creates the chain for `account_name`.
    pub fn new(account_name: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            fallback: AzureCliAuthenticator::new(),
        }
    }

    /// Replaces the Azure CLI fallback.
    pub fn with_fallback(mut self, fallback: AzureCliAuthenticator) -> Self {
        self.fallback = fallback;
        self
    }

    /// Picks a credential from the variables visible through `lookup`.
    fn resolve<F>(&self, lookup: F) -> Option<Credential>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty(ENV_STORAGE_KEY) {
            return Some(Credential::SharedKey {
                account: self.account_name.clone(),
                key,
            });
        }

        if let Some(token) = non_empty(ENV_SAS_TOKEN) {
            return Some(Credential::Sas(token));
        }

        non_empty(ENV_BEARER_TOKEN).map(Credential::Bearer)
    }
}

#[async_trait::async_trait]
impl Authenticator for EnvironmentAuthenticator {
    async fn acquire_credential(&self) -> Result<Credential> {
        if let Some(credential) = self.resolve(|name| std::env::var(name).ok()) {
            tracing::debug!(
                target: TRACING_TARGET,
                kind = credential.kind(),
                "Using credential from environment"
            );
            return Ok(credential);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            "No credential in environment, falling back to Azure CLI"
        );
        self.fallback.acquire_credential().await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn resolve(vars: &[(&str, &str)]) -> Option<Credential> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        EnvironmentAuthenticator::new("myaccount").resolve(|name| vars.get(name).cloned())
    }

    #[test]
    fn shared_key_wins() {
        let credential = resolve(&[
            (ENV_BEARER_TOKEN, "token"),
            (ENV_STORAGE_KEY, "a2V5"),
            (ENV_SAS_TOKEN, "sv=1"),
        ]);
        assert_eq!(
            credential,
            Some(Credential::SharedKey {
                account: "myaccount".into(),
                key: "a2V5".into(),
            })
        );
    }

    #[test]
    fn sas_before_bearer() {
        let credential = resolve(&[(ENV_BEARER_TOKEN, "token"), (ENV_SAS_TOKEN, "sv=1")]);
        assert_eq!(credential, Some(Credential::Sas("sv=1".into())));
    }

    #[test]
    fn bearer_token() {
        let credential = resolve(&[(ENV_BEARER_TOKEN, "token")]);
        assert_eq!(credential, Some(Credential::Bearer("token".into())));
    }

    #[test]
    fn blank_values_are_ignored() {
        assert_eq!(resolve(&[(ENV_STORAGE_KEY, "  ")]), None);
        assert_eq!(resolve(&[]), None);
    }
}
