//! Listing abstractions consumed by the counter.
//!
//! A [`ListingProvider`] hands out one [`ContainerPager`] per operation. The
//! pager is a stateful cursor over server-driven pages: its continuation
//! token stays private, and callers only see [`ContainerPager::has_more`] and
//! [`ContainerPager::next_page`].

mod page;
mod scope;

use std::fmt;
use std::num::NonZeroU32;

pub use page::{ContainerItem, Page};
pub use scope::FetchScope;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Positive page-size hint forwarded to the listing endpoint.
///
/// This is advisory: the server may return fewer items per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(NonZeroU32);

impl PageSize {
    /// Page size used when none is configured.
    pub const DEFAULT: Self = Self(NonZeroU32::new(100).unwrap());

    /// Creates a page size hint, rejecting zero.
    pub fn new(value: u32) -> Result<Self> {
        NonZeroU32::new(value).map(Self).ok_or_else(|| {
            Error::invalid_input().with_message("page size hint must be greater than zero")
        })
    }

    /// Returns the hint as a plain integer.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for PageSize {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        value.get()
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Options used to create a pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Maximum number of items requested per page.
    pub page_size: PageSize,
    /// Whether container metadata is returned with each entry.
    #[serde(default)]
    pub include_metadata: bool,
    /// Whether soft-deleted containers are listed.
    #[serde(default)]
    pub include_deleted: bool,
    /// Whether system containers are listed.
    #[serde(default)]
    pub include_system: bool,
    /// Only list containers whose name starts with this prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl ListOptions {
    /// Creates options with everything optional excluded.
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            include_metadata: false,
            include_deleted: false,
            include_system: false,
            prefix: None,
        }
    }

    /// Options used for counting: soft-deleted, system and
    /// metadata-augmented entries are always excluded.
    pub fn counting(page_size: PageSize) -> Self {
        Self::new(page_size)
    }

    /// Sets whether metadata is included.
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    /// Sets whether soft-deleted containers are included.
    pub fn with_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    /// Sets whether system containers are included.
    pub fn with_system(mut self, include: bool) -> Self {
        self.include_system = include;
        self
    }

    /// Restricts the listing to names starting with `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Returns the `include` values requested, in wire order.
    pub fn includes(&self) -> Vec<&'static str> {
        [
            self.include_metadata.then_some("metadata"),
            self.include_deleted.then_some("deleted"),
            self.include_system.then_some("system"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Stateful cursor over the pages of one listing.
///
/// Pages are yielded in server order, each exactly once. A pager is owned by
/// the operation that created it and is never reused.
#[async_trait::async_trait]
pub trait ContainerPager: Send {
    /// Returns `true` while the server may still have pages to return.
    fn has_more(&self) -> bool;

    /// Fetches the next page.
    ///
    /// Implementations should observe `scope` so that an expired deadline or
    /// a cancelled operation returns promptly.
    async fn next_page(&mut self, scope: &FetchScope) -> Result<Page>;
}

/// Source of container pagers.
pub trait ListingProvider: Send + Sync {
    /// Creates a fresh pager positioned before the first page.
    fn create_pager(&self, options: ListOptions) -> Box<dyn ContainerPager>;
}

impl<P> ListingProvider for std::sync::Arc<P>
where
    P: ListingProvider + ?Sized,
{
    fn create_pager(&self, options: ListOptions) -> Box<dyn ContainerPager> {
        (**self).create_pager(options)
    }
}
