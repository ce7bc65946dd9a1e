//! Fan-out Coordinator.
//!
//! Spawns one worker per URL under a shared [`Deadline`], waits for every
//! worker to settle, and assembles the results in input order.

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::fetch::deadline::Deadline;
use crate::fetch::error::{FetchError, RequestError};
use crate::fetch::types::{FetchRequest, FetchResult, FetchResultSet};
use crate::fetch::worker;
use crate::observability::metrics;

/// Lifecycle of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// Workers launched, none returned.
    Pending,
    /// Some, but not all, workers returned.
    Collecting,
    /// Every worker returned.
    Complete,
}

/// Counts worker completions and walks the batch through its states.
#[derive(Debug)]
pub struct BatchTracker {
    total: usize,
    received: usize,
    state: BatchState,
}

impl BatchTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            received: 0,
            state: BatchState::Pending,
        }
    }

    /// Record one completion and return the resulting state.
    ///
    /// The first completion always moves through `Collecting`, even when it is
    /// also the last one.
    pub fn record(&mut self) -> BatchState {
        if self.state == BatchState::Complete {
            tracing::warn!(total = self.total, "Completion recorded after batch finished");
            return self.state;
        }

        self.received += 1;
        if self.state == BatchState::Pending {
            self.transition(BatchState::Collecting);
        }
        if self.received >= self.total {
            self.transition(BatchState::Complete);
        }
        self.state
    }

    fn transition(&mut self, next: BatchState) {
        tracing::debug!(
            from = ?self.state,
            to = ?next,
            received = self.received,
            total = self.total,
            "Batch state change"
        );
        self.state = next;
    }

    pub fn state(&self) -> BatchState {
        self.state
    }
}

/// Fetch every URL of `request` concurrently with the shared `client`.
///
/// The batch is bound to one deadline `timeout` from now, scoped under
/// `scope`: cancelling `scope`, or dropping the returned future, cancels every
/// outstanding fetch. The only error is a batch-level precondition failure.
pub async fn dispatch(
    client: &Client,
    request: FetchRequest,
    timeout: Duration,
    scope: &CancellationToken,
) -> Result<FetchResultSet, RequestError> {
    let client = client.clone();
    dispatch_with(request, timeout, scope, move |url, deadline| {
        let client = client.clone();
        async move { worker::fetch(&client, &url, &deadline).await }
    })
    .await
}

/// [`dispatch`] with a caller-supplied worker.
pub async fn dispatch_with<F, Fut>(
    request: FetchRequest,
    timeout: Duration,
    scope: &CancellationToken,
    worker: F,
) -> Result<FetchResultSet, RequestError>
where
    F: Fn(String, Deadline) -> Fut,
    Fut: Future<Output = FetchResult> + Send + 'static,
{
    if request.is_empty() {
        return Err(RequestError::NoUrls);
    }

    let started = Instant::now();
    let total = request.len();
    let deadline = Deadline::child_of(scope, timeout);
    // Released on every exit path, including the caller dropping us.
    let _release = deadline.token().clone().drop_guard();

    tracing::debug!(urls = total, timeout = ?timeout, "Dispatching batch");

    let mut tracker = BatchTracker::new(total);
    let mut slots: Vec<Option<FetchResult>> = vec![None; total];
    let mut workers = JoinSet::new();

    for (index, url) in request.urls.iter().enumerate() {
        let task = worker(url.clone(), deadline.clone());
        workers.spawn(async move { (index, task.await) });
    }

    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            // The slot stays empty and is filled with a failure below.
            Err(e) => tracing::error!(error = %e, "Fetch worker ended without a result"),
        }
        tracker.record();
    }

    let results: FetchResultSet = slots
        .into_iter()
        .zip(request.urls)
        .map(|(slot, url)| {
            slot.unwrap_or_else(|| {
                metrics::record_fetch("aborted");
                FetchResult::failure(
                    url,
                    FetchError::Aborted("worker exited without reporting a result".to_string()),
                )
            })
        })
        .collect();

    let failed = results.iter().filter(|r| !r.is_success()).count();
    tracing::info!(
        urls = total,
        failed,
        state = ?tracker.state(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Batch complete"
    );
    metrics::record_batch(total, failed, started);

    Ok(results)
}
