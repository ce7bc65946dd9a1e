//! Request and result types for a fetch batch.
//!
//! Results are a tagged union internally. On the wire they keep the flat
//! `{"url", "data", "error"}` shape, with the absent side rendered as `""`.

use serde::{Deserialize, Serialize};

/// Incoming batch of URLs, as decoded from `{"urls": [...]}`.
///
/// A missing or `null` `urls` field decodes to an empty list so that it is
/// rejected the same way as `[]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FetchRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub urls: Vec<String>,
}

impl FetchRequest {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outcome of fetching a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Full response body, decoded as text.
    Success { body: String },
    /// Human-readable description of what went wrong.
    Failure { error: String },
}

/// Result for one input URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireResult", from = "WireResult")]
pub struct FetchResult {
    pub url: String,
    pub outcome: FetchOutcome,
}

impl FetchResult {
    pub fn success(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome: FetchOutcome::Success { body: body.into() },
        }
    }

    pub fn failure(url: impl Into<String>, error: impl ToString) -> Self {
        Self {
            url: url.into(),
            outcome: FetchOutcome::Failure {
                error: error.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Success { .. })
    }

    pub fn body(&self) -> Option<&str> {
        match &self.outcome {
            FetchOutcome::Success { body } => Some(body),
            FetchOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            FetchOutcome::Success { .. } => None,
            FetchOutcome::Failure { error } => Some(error),
        }
    }
}

/// Complete, input-ordered results of one batch.
pub type FetchResultSet = Vec<FetchResult>;

/// Flat wire representation of a [`FetchResult`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WireResult {
    url: String,
    #[serde(default)]
    data: String,
    #[serde(default)]
    error: String,
}

impl From<FetchResult> for WireResult {
    fn from(result: FetchResult) -> Self {
        match result.outcome {
            FetchOutcome::Success { body } => Self {
                url: result.url,
                data: body,
                error: String::new(),
            },
            FetchOutcome::Failure { error } => Self {
                url: result.url,
                data: String::new(),
                error,
            },
        }
    }
}

impl From<WireResult> for FetchResult {
    fn from(wire: WireResult) -> Self {
        // A non-empty error always wins: a failed fetch never carries data.
        let outcome = if wire.error.is_empty() {
            FetchOutcome::Success { body: wire.data }
        } else {
            FetchOutcome::Failure { error: wire.error }
        };
        Self {
            url: wire.url,
            outcome,
        }
    }
}
