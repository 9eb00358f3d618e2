//! Bearer tokens from the Azure CLI.

use serde::Deserialize;
use tokio::process::Command;

use super::{Authenticator, Credential, TRACING_TARGET};
use crate::{Error, Result};

/// Resource the storage token is requested for.
pub const STORAGE_RESOURCE: &str = "https://storage.azure.com/";

#[cfg(windows)]
const AZ_PROGRAM: &str = "az.cmd";
#[cfg(not(windows))]
const AZ_PROGRAM: &str = "az";

/// Output of `az account get-access-token --output json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessToken {
    access_token: String,
    #[serde(default)]
    expires_on: Option<String>,
}

/// Acquires a storage bearer token from a signed-in Azure CLI.
#[derive(Debug, Clone)]
pub struct AzureCliAuthenticator {
    program: String,
    tenant: Option<String>,
}

impl Default for AzureCliAuthenticator {
    fn default() -> Self {
        Self {
            program: AZ_PROGRAM.to_owned(),
            tenant: None,
        }
    }
}

impl AzureCliAuthenticator {
    /// Creates an authenticator using `az` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the token for a specific tenant.
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Uses a different executable in place of `az`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn parse_token(stdout: &[u8]) -> Result<Credential> {
        let token: AccessToken =
            serde_json::from_slice(stdout).map_err(crate::error::Error::from)?;

        if token.access_token.is_empty() {
            return Err(Error::authentication().with_message("Azure CLI returned an empty token"));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            expires_on = ?token.expires_on,
            "Acquired token from Azure CLI"
        );

        Ok(Credential::Bearer(token.access_token))
    }
}

#[async_trait::async_trait]
impl Authenticator for AzureCliAuthenticator {
    async fn acquire_credential(&self) -> Result<Credential> {
        let mut command = Command::new(&self.program);
        command.args([
            "account",
            "get-access-token",
            "--resource",
            STORAGE_RESOURCE,
            "--output",
            "json",
        ]);
        if let Some(tenant) = &self.tenant {
            command.args(["--tenant", tenant.as_str()]);
        }

        let output = command.output().await.map_err(|e| {
            Error::authentication()
                .with_message(format!("failed to run '{}'", self.program))
                .with_source(e)
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::authentication().with_message(format!(
                "Azure CLI exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Self::parse_token(&output.stdout)
    }
}
