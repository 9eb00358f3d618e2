//! Execution scope shared by every fetch of one listing walk.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Distance of the deadline used when `now + timeout` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Deadline and cancellation handle bound to a single count operation.
///
/// The deadline is fixed when the scope is created and is never reset, so
/// time spent on early pages is not available to later ones.
#[derive(Debug, Clone)]
pub struct FetchScope {
    deadline: Instant,
    cancel_token: CancellationToken,
}

impl FetchScope {
    /// Creates a scope that expires `timeout` from now.
    ///
    /// Timeouts too large to represent are capped at a deadline roughly
    /// thirty years out.
    pub fn new(timeout: Duration, cancel_token: CancellationToken) -> Self {
        let now = Instant::now();
        let deadline = now.checked_add(timeout).unwrap_or(now + FAR_FUTURE);
        Self::with_deadline(deadline, cancel_token)
    }

    /// Creates a scope with an explicit deadline.
    pub fn with_deadline(deadline: Instant, cancel_token: CancellationToken) -> Self {
        Self {
            deadline,
            cancel_token,
        }
    }

    /// Point in time after which the whole operation has failed.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Returns `true` once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Returns `true` if the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Token observed by the operation.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    /// Completes when the operation is cancelled.
    pub async fn cancelled(&self) {
        self.cancel_token.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn remaining_shrinks_and_saturates() {
        let scope = FetchScope::new(Duration::from_millis(500), CancellationToken::new());
        assert_eq!(scope.remaining(), Duration::from_millis(500));
        assert!(!scope.is_expired());

        tokio::time::advance(Duration::from_millis(200)).await;
        assert_eq!(scope.remaining(), Duration::from_millis(300));

        tokio::time::advance(Duration::from_millis(400)).await;
        assert_eq!(scope.remaining(), Duration::ZERO);
        assert!(scope.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_timeout_is_capped() {
        let scope = FetchScope::new(Duration::MAX, CancellationToken::new());
        assert!(!scope.is_expired());
        assert_eq!(scope.remaining(), FAR_FUTURE);
    }

    #[tokio::test]
    async fn cancellation_is_visible() {
        let token = CancellationToken::new();
        let scope = FetchScope::new(Duration::from_secs(1), token.clone());
        assert!(!scope.is_cancelled());

        token.cancel();
        scope.cancelled().await;
        assert!(scope.is_cancelled());
    }
}
