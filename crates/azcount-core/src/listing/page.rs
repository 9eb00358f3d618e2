//! Pages and the items they carry.

use serde::{Deserialize, Serialize};

/// One container entry from a listing page.
///
/// The counter only relies on how many of these a page holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerItem {
    /// Container name.
    pub name: String,
    /// Whether the container is soft-deleted.
    #[serde(default)]
    pub deleted: bool,
    /// Version of a soft-deleted container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ContainerItem {
    /// Creates a live container entry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deleted: false,
            version: None,
        }
    }
}

/// One batch of entries returned by a single listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    items: Vec<ContainerItem>,
}

impl Page {
    /// Creates a page from its items, in server order.
    pub fn new(items: Vec<ContainerItem>) -> Self {
        Self { items }
    }

    /// Number of entries in the page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the page carries no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries in server order.
    pub fn items(&self) -> &[ContainerItem] {
        &self.items
    }

    /// Consumes the page and returns its entries.
    pub fn into_items(self) -> Vec<ContainerItem> {
        self.items
    }
}

impl FromIterator<ContainerItem> for Page {
    fn from_iter<I: IntoIterator<Item = ContainerItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
