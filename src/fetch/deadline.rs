//! Shared, cancellable cutoff for one batch.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::fetch::error::FetchError;

/// A point in time after which every in-flight fetch of a batch gives up.
///
/// Clones share the same cancellation token, so cancelling any clone stops
/// every worker that holds one.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    timeout: Duration,
    token: CancellationToken,
}

impl Deadline {
    /// Deadline `timeout` from now with its own cancellation scope.
    pub fn after(timeout: Duration) -> Self {
        Self::with_token(timeout, CancellationToken::new())
    }

    /// Deadline `timeout` from now that is also cancelled when `parent` is.
    pub fn child_of(parent: &CancellationToken, timeout: Duration) -> Self {
        Self::with_token(timeout, parent.child_token())
    }

    fn with_token(timeout: Duration, token: CancellationToken) -> Self {
        Self {
            at: Instant::now() + timeout,
            timeout,
            token,
        }
    }

    /// Cancel every operation bound to this deadline.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Drive `fut` to completion unless the deadline passes or the batch is
    /// cancelled first. Cancellation wins ties.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, FetchError>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(FetchError::Cancelled),
            _ = time::sleep_until(self.at) => Err(FetchError::DeadlineExceeded {
                timeout: self.timeout,
            }),
            output = fut => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes_before_deadline() {
        let deadline = Deadline::after(Duration::from_secs(1));
        let value = deadline.run(async { 42 }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let deadline = Deadline::after(Duration::from_millis(50));
        let result = deadline
            .run(time::sleep(Duration::from_secs(10)))
            .await;
        assert!(matches!(result, Err(FetchError::DeadlineExceeded { .. })));
    }

    #[tokio::test]
    async fn test_cancel_reaches_every_clone() {
        let deadline = Deadline::after(Duration::from_secs(30));
        let worker = deadline.clone();
        let handle = tokio::spawn(async move {
            worker.run(time::sleep(Duration::from_secs(30))).await
        });

        deadline.cancel();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(FetchError::Cancelled)));
    }

    #[tokio::test]
    async fn test_parent_cancellation_propagates() {
        let parent = CancellationToken::new();
        let deadline = Deadline::child_of(&parent, Duration::from_secs(30));
        assert!(!deadline.token().is_cancelled());

        parent.cancel();
        assert!(deadline.token().is_cancelled());
        let result = deadline.run(std::future::pending::<()>()).await;
        assert!(matches!(result, Err(FetchError::Cancelled)));
    }
}
