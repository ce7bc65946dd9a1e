use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchRequest {
    pub urls: Vec<String>,
}

/// One entry of a `/fetch` response. Exactly one of `data`/`error` is set
/// for a well-formed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchEntry {
    pub url: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub error: String,
}

impl FetchEntry {
    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }
}

/// Error returned by [`FetcherClient`].
#[derive(Debug)]
pub enum SdkError {
    /// Transport failure talking to the fetcher.
    Http(reqwest::Error),
    /// The fetcher rejected the batch (4xx) with a plain-text reason.
    Rejected { status: StatusCode, message: String },
    /// The response body was not the expected JSON.
    Decode(serde_json::Error),
}

impl std::fmt::Display for SdkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SdkError::Http(e) => write!(f, "HTTP error: {}", e),
            SdkError::Rejected { status, message } => {
                write!(f, "Fetcher returned error status {}: {}", status, message)
            }
            SdkError::Decode(e) => write!(f, "Decode error: {}", e),
        }
    }
}

impl std::error::Error for SdkError {}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        SdkError::Http(e)
    }
}

pub struct FetcherClient {
    client: Client,
    base_url: String,
}

impl FetcherClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder().no_proxy().build().unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit a batch and return one entry per URL.
    pub async fn fetch(&self, urls: &[&str]) -> Result<Vec<FetchEntry>, SdkError> {
        let req = FetchRequest {
            urls: urls.iter().map(|u| u.to_string()).collect(),
        };
        let resp = self
            .client
            .post(format!("{}/fetch", self.base_url))
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(SdkError::Rejected {
                status,
                message: text,
            });
        }

        serde_json::from_str(&text).map_err(SdkError::Decode)
    }

    /// Liveness text from `GET /`.
    pub async fn status(&self) -> Result<String, SdkError> {
        let resp = self.client.get(format!("{}/", self.base_url)).send().await?;
        Ok(resp.text().await?)
    }
}
