//! Prelude module for convenient imports.

pub use crate::counter::PagedCounter;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::listing::{
    ContainerItem, ContainerPager, FetchScope, ListOptions, ListingProvider, Page, PageSize,
};
