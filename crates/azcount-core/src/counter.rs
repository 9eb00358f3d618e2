//! Deadline-bound aggregation over a paginated container listing.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::listing::{ContainerPager, FetchScope, ListOptions, ListingProvider, Page, PageSize};
use crate::{Error, Result};

/// Tracing target for counting operations.
pub const TRACING_TARGET: &str = "azcount_core::counter";

/// Counts every container exposed by a [`ListingProvider`].
///
/// Each call to [`count`](Self::count) creates its own pager and accumulator
/// and walks the listing to exhaustion. The configured timeout bounds the
/// whole walk: the deadline is computed once, before the first page.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
/// use azcount_core::PagedCounter;
///
/// let counter = PagedCounter::new(client, 100, Duration::from_secs(5))?;
/// let containers = counter.count().await?;
/// println!("{containers} containers found.");
/// ```
#[derive(Debug, Clone)]
pub struct PagedCounter<P> {
    provider: P,
    page_size: PageSize,
    timeout: Duration,
}

impl<P> PagedCounter<P>
where
    P: ListingProvider,
{
    /// Creates a counter.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidInput`](crate::ErrorKind::InvalidInput) error if
    /// `page_size` or `timeout` is zero. Nothing is sent over the network.
    pub fn new(provider: P, page_size: u32, timeout: Duration) -> Result<Self> {
        let page_size = PageSize::new(page_size)?;
        if timeout.is_zero() {
            return Err(Error::invalid_input().with_message("timeout must be greater than zero"));
        }

        Ok(Self {
            provider,
            page_size,
            timeout,
        })
    }

    /// Page-size hint sent with every page request.
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Budget for the whole listing walk.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Walks every page and returns the total number of containers.
    ///
    /// # Errors
    ///
    /// Returns the first page-fetch failure unchanged, or a
    /// [`DeadlineExceeded`](crate::ErrorKind::DeadlineExceeded) error when
    /// the walk outlives the timeout. No partial count is returned.
    pub async fn count(&self) -> Result<u64> {
        self.count_with_cancellation(CancellationToken::new()).await
    }

    /// Same as [`count`](Self::count), but also stops with a
    /// [`Cancelled`](crate::ErrorKind::Cancelled) error once `cancel_token`
    /// is cancelled.
    #[tracing::instrument(
        skip(self, cancel_token),
        fields(page_size = %self.page_size, timeout_ms = self.timeout.as_millis()),
        target = "azcount_core::counter",
        name = "count_containers"
    )]
    pub async fn count_with_cancellation(&self, cancel_token: CancellationToken) -> Result<u64> {
        let started_at = Instant::now();
        let scope = FetchScope::new(self.timeout, cancel_token.child_token());

        // In-flight work tied to the scope stops once the walk returns.
        let _scope_guard = scope.cancellation_token().clone().drop_guard();

        let mut pager = self
            .provider
            .create_pager(ListOptions::counting(self.page_size));

        let mut total: u64 = 0;
        let mut pages: u64 = 0;

        while pager.has_more() {
            let page = match fetch_page(pager.as_mut(), &scope).await {
                Ok(page) => page,
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        pages,
                        kind = error.kind_str(),
                        error = %error,
                        elapsed_ms = started_at.elapsed().as_millis(),
                        "Container listing aborted"
                    );
                    return Err(error);
                }
            };

            pages += 1;
            total += page.len() as u64;

            tracing::debug!(
                target: TRACING_TARGET,
                page = pages,
                items = page.len(),
                total,
                remaining_ms = scope.remaining().as_millis(),
                "Fetched container page"
            );
        }

        tracing::info!(
            target: TRACING_TARGET,
            pages,
            total,
            elapsed_ms = started_at.elapsed().as_millis(),
            "Container listing complete"
        );

        Ok(total)
    }
}

/// Fetches one page, enforcing the scope's deadline and cancellation.
async fn fetch_page(pager: &mut dyn ContainerPager, scope: &FetchScope) -> Result<Page> {
    if scope.is_cancelled() {
        return Err(cancelled_error());
    }
    if scope.is_expired() {
        return Err(deadline_error());
    }

    tokio::select! {
        biased;

        () = scope.cancelled() => Err(cancelled_error()),

        result = tokio::time::timeout_at(scope.deadline(), pager.next_page(scope)) => {
            result.unwrap_or_else(|_| Err(deadline_error()))
        }
    }
}

fn cancelled_error() -> Error {
    Error::cancelled().with_message("container listing was cancelled")
}

fn deadline_error() -> Error {
    Error::deadline_exceeded().with_message("container listing did not finish before the deadline")
}
