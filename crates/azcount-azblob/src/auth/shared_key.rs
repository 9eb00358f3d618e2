//! Shared Key request signing for the Blob service.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Signs requests with a storage account key.
#[derive(Clone)]
pub(crate) struct SharedKeySigner {
    account: String,
    key: Vec<u8>,
}

impl std::fmt::Debug for SharedKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeySigner")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl SharedKeySigner {
    /// Creates a signer from a base64-encoded account key.
    pub fn new(account: impl Into<String>, key: &str) -> Result<Self> {
        let key = STANDARD.decode(key.trim()).map_err(|e| {
            Error::configuration()
                .with_message("storage account key is not valid base64")
                .with_source(e)
        })?;

        Ok(Self {
            account: account.into(),
            key,
        })
    }

    /// Returns the `Authorization` header value for a GET request.
    ///
    /// `ms_headers` are the `x-ms-*` headers sent with the request and
    /// `query` holds the decoded query parameters.
    pub fn authorization(
        &self,
        path: &str,
        ms_headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> String {
        let string_to_sign = self.string_to_sign(path, ms_headers, query);

        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        format!("SharedKey {}:{signature}", self.account)
    }

    fn string_to_sign(
        &self,
        path: &str,
        ms_headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> String {
        // Verb followed by eleven standard headers, all empty for a bodiless GET.
        let mut out = String::from("GET\n");
        out.push_str(&"\n".repeat(11));

        let mut headers: Vec<(String, &str)> = ms_headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.trim()))
            .collect();
        headers.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in headers {
            out.push_str(&name);
            out.push(':');
            out.push_str(value);
            out.push('\n');
        }

        out.push('/');
        out.push_str(&self.account);
        out.push_str(path);

        let mut params: Vec<(String, &str)> = query
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), *value))
            .collect();
        params.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in params {
            out.push('\n');
            out.push_str(&name);
            out.push(':');
            out.push_str(value);
        }

        out
    }
}
