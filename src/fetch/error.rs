//! Error taxonomy for the fetch engine.
//!
//! - [`RequestError`] rejects a whole batch before any worker starts.
//! - [`FetchError`] describes one URL's failure and is folded into that URL's
//!   result; it never aborts the batch.

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

/// Batch-level errors. Surfaced to the caller as a 4xx response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Only POST requests are allowed")]
    MethodNotAllowed,

    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),

    #[error("No URLs provided")]
    NoUrls,

    #[error("Too many URLs provided: {count} exceeds the limit of {max}")]
    TooManyUrls { count: usize, max: usize },
}

impl RequestError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            RequestError::MethodNotAllowed => "method_not_allowed",
            RequestError::InvalidJson(_) => "invalid_json",
            RequestError::NoUrls => "no_urls",
            RequestError::TooManyUrls { .. } => "too_many_urls",
        }
    }
}

/// Per-URL errors.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("context deadline exceeded after {timeout:?}")]
    DeadlineExceeded { timeout: Duration },

    #[error("request cancelled before completion")]
    Cancelled,

    #[error("worker aborted: {0}")]
    Aborted(String),
}

impl FetchError {
    /// Classify a reqwest error raised while sending the request.
    pub fn from_send(err: reqwest::Error) -> Self {
        let detail = describe(&err);
        if err.is_connect() {
            FetchError::Connect(detail)
        } else if err.is_body() || err.is_decode() {
            FetchError::Body(detail)
        } else {
            FetchError::Request(detail)
        }
    }

    /// Classify a reqwest error raised while reading the response body.
    pub fn from_body(err: reqwest::Error) -> Self {
        FetchError::Body(describe(&err))
    }

    /// Label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl { .. } => "invalid_url",
            FetchError::Connect(_) => "connect",
            FetchError::Request(_) => "request",
            FetchError::Body(_) => "body",
            FetchError::DeadlineExceeded { .. } => "deadline",
            FetchError::Cancelled => "cancelled",
            FetchError::Aborted(_) => "aborted",
        }
    }
}

/// Render an error with its full source chain.
///
/// reqwest hides the interesting part ("connection refused",
/// "connection closed before message completed") in the sources.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
