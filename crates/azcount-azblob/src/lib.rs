#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;
mod pager;
mod response;

pub mod auth;

pub use azcount_core::{Error, ErrorKind, Result};

pub use crate::auth::{
    Authenticator, AzureCliAuthenticator, Credential, EnvironmentAuthenticator,
    StaticAuthenticator,
};
pub use crate::client::{AzureBlobClient, TRACING_TARGET};
pub use crate::config::{AzureBlobConfig, DEFAULT_API_VERSION};
pub use crate::pager::AzureBlobPager;
