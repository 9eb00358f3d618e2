//! Internal error types for azcount-azblob.

use thiserror::Error;

/// Result type alias for fallible internal operations.
pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Internal error type, converted into [`azcount_core::Error`] at the
/// crate boundary.
#[derive(Debug, Error)]
pub(crate) enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Listing response was not valid XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),
    /// JSON output of an external tool could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<Error> for azcount_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    azcount_core::Error::network_error()
                        .with_message("request timed out")
                        .with_source(e)
                } else if e.is_connect() {
                    azcount_core::Error::network_error()
                        .with_message("connection failed")
                        .with_source(e)
                } else if e.is_decode() {
                    azcount_core::Error::serialization()
                        .with_message(e.to_string())
                        .with_source(e)
                } else {
                    azcount_core::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Xml(e) => azcount_core::Error::serialization()
                .with_message(format!("malformed listing response: {e}"))
                .with_source(e),
            Error::Json(e) => azcount_core::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
        }
    }
}
