//! Credential source selection.

use azcount_azblob::{
    Authenticator, AzureCliAuthenticator, EnvironmentAuthenticator, StaticAuthenticator,
};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Where request credentials come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Account key, SAS or bearer token from the environment, then the Azure CLI.
    #[default]
    Env,
    /// Bearer token from `az account get-access-token`.
    Cli,
    /// No credentials.
    Anonymous,
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Credential source used to authorize listing requests.
    #[arg(long = "auth", env = "AZCOUNT_AUTH", value_enum, default_value_t = AuthMethod::Env)]
    #[serde(default)]
    pub method: AuthMethod,

    /// Tenant passed to the Azure CLI when requesting a token.
    #[arg(long = "tenant", env = "AZURE_TENANT_ID")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
}

impl AuthConfig {
    /// Builds the authenticator for `account_name`.
    pub fn authenticator(&self, account_name: &str) -> Box<dyn Authenticator> {
        let mut cli = AzureCliAuthenticator::new();
        if let Some(tenant) = &self.tenant {
            cli = cli.with_tenant(tenant);
        }

        match self.method {
            AuthMethod::Env => {
                Box::new(EnvironmentAuthenticator::new(account_name).with_fallback(cli))
            }
            AuthMethod::Cli => Box::new(cli),
            AuthMethod::Anonymous => Box::new(StaticAuthenticator::anonymous()),
        }
    }

    /// Logs the authentication settings.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            method = ?self.method,
            tenant = ?self.tenant,
            "Authentication configuration"
        );
    }
}
