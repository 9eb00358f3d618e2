//! Scripted in-memory listing provider for tests.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! azcount-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use azcount_core::mock::MockProvider;
//! use azcount_core::ErrorKind;
//!
//! let provider = MockProvider::new()
//!     .page(100)
//!     .delayed_page(100, Duration::from_millis(250))
//!     .failure(ErrorKind::NetworkError, "connection reset");
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::listing::{
    ContainerItem, ContainerPager, FetchScope, ListOptions, ListingProvider, Page, PageSize,
};
use crate::{Error, ErrorKind, Result};

/// One scripted response.
#[derive(Debug, Clone)]
enum MockStep {
    Page { items: usize, delay: Duration },
    Failure {
        kind: ErrorKind,
        message: String,
        delay: Duration,
    },
}

impl MockStep {
    fn delay(&self) -> Duration {
        match self {
            Self::Page { delay, .. } | Self::Failure { delay, .. } => *delay,
        }
    }
}

#[derive(Debug, Default)]
struct MockLog {
    created: Vec<ListOptions>,
    requested: Vec<PageSize>,
}

/// Listing provider that replays a fixed script of pages and failures.
///
/// Every pager created from the same provider replays the script from the
/// start. Requests are recorded so tests can inspect what was asked for.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    steps: Vec<MockStep>,
    log: Arc<Mutex<MockLog>>,
}

impl MockProvider {
    /// Creates a provider with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a page of `items` entries returned immediately.
    pub fn page(self, items: usize) -> Self {
        self.delayed_page(items, Duration::ZERO)
    }

    /// Appends a page of `items` entries returned after `delay`.
    pub fn delayed_page(mut self, items: usize, delay: Duration) -> Self {
        self.steps.push(MockStep::Page { items, delay });
        self
    }

    /// Appends a fetch that fails with the given kind.
    pub fn failure(self, kind: ErrorKind, message: impl Into<String>) -> Self {
        self.delayed_failure(kind, message, Duration::ZERO)
    }

    /// Appends a fetch that fails with the given kind after `delay`.
    pub fn delayed_failure(
        mut self,
        kind: ErrorKind,
        message: impl Into<String>,
        delay: Duration,
    ) -> Self {
        self.steps.push(MockStep::Failure {
            kind,
            message: message.into(),
            delay,
        });
        self
    }

    /// Options of every pager created so far.
    pub fn created_pagers(&self) -> Vec<ListOptions> {
        self.lock().created.clone()
    }

    /// Page-size hint of every page request made so far.
    pub fn requested_page_sizes(&self) -> Vec<PageSize> {
        self.lock().requested.clone()
    }

    /// Number of page requests made so far.
    pub fn fetch_count(&self) -> usize {
        self.lock().requested.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ListingProvider for MockProvider {
    fn create_pager(&self, options: ListOptions) -> Box<dyn ContainerPager> {
        self.lock().created.push(options.clone());

        Box::new(MockPager {
            options,
            steps: self.steps.iter().cloned().collect(),
            log: Arc::clone(&self.log),
            page_index: 0,
        })
    }
}

/// Pager replaying a [`MockProvider`] script.
#[derive(Debug)]
pub struct MockPager {
    options: ListOptions,
    steps: VecDeque<MockStep>,
    log: Arc<Mutex<MockLog>>,
    page_index: usize,
}

#[async_trait::async_trait]
impl ContainerPager for MockPager {
    fn has_more(&self) -> bool {
        !self.steps.is_empty()
    }

    async fn next_page(&mut self, _scope: &FetchScope) -> Result<Page> {
        let step = self.steps.pop_front().ok_or_else(|| {
            Error::invalid_input().with_message("next_page called on an exhausted pager")
        })?;

        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .requested
            .push(self.options.page_size);

        let delay = step.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let page_index = self.page_index;
        self.page_index += 1;

        match step {
            MockStep::Page { items, .. } => Ok(scripted_page(page_index, items)),
            MockStep::Failure { kind, message, .. } => Err(Error::new(kind).with_message(message)),
        }
    }
}

fn scripted_page(page_index: usize, items: usize) -> Page {
    (0..items)
        .map(|i| ContainerItem::new(format!("container-{page_index}-{i}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;

    #[tokio::test]
    async fn replays_script_in_order() {
        let provider = MockProvider::new()
            .page(2)
            .failure(ErrorKind::NotFound, "gone");
        let mut pager = provider.create_pager(ListOptions::counting(PageSize::DEFAULT));
        let scope = FetchScope::new(Duration::from_secs(1), CancellationToken::new());

        assert!(pager.has_more());
        let page = pager.next_page(&scope).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.items()[0].name, "container-0-0");

        let err = pager.next_page(&scope).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!pager.has_more());
    }

    #[tokio::test]
    async fn exhausted_pager_reports_misuse() {
        let provider = MockProvider::new();
        let mut pager = provider.create_pager(ListOptions::counting(PageSize::DEFAULT));
        let scope = FetchScope::new(Duration::from_secs(1), CancellationToken::new());

        assert!(!pager.has_more());
        assert!(pager.next_page(&scope).await.is_err());
        assert_eq!(provider.fetch_count(), 0);
    }
}
