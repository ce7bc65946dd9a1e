//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fetcher_batches_total` (counter): accepted batches
//! - `fetcher_batch_failed_urls_total` (counter): URLs that ended in failure
//! - `fetcher_batch_urls` (histogram): URLs per batch
//! - `fetcher_batch_duration_seconds` (histogram): fan-out wall-clock time
//! - `fetcher_fetches_total` (counter): per-URL outcomes by `outcome`
//! - `fetcher_requests_rejected_total` (counter): batch rejections by `reason`

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished batch.
pub fn record_batch(urls: usize, failed: usize, started: Instant) {
    metrics::counter!("fetcher_batches_total").increment(1);
    metrics::counter!("fetcher_batch_failed_urls_total").increment(failed as u64);
    metrics::histogram!("fetcher_batch_urls").record(urls as f64);
    metrics::histogram!("fetcher_batch_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// Record the outcome of one URL (`success` or a failure kind).
pub fn record_fetch(outcome: &'static str) {
    metrics::counter!("fetcher_fetches_total", "outcome" => outcome).increment(1);
}

/// Record a batch rejected before dispatch.
pub fn record_rejection(reason: &'static str) {
    metrics::counter!("fetcher_requests_rejected_total", "reason" => reason).increment(1);
}
