#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod counter;
mod error;

pub mod listing;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

#[doc(hidden)]
pub mod prelude;

pub use counter::{PagedCounter, TRACING_TARGET};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use listing::{
    ContainerItem, ContainerPager, FetchScope, ListOptions, ListingProvider, Page, PageSize,
};
