//! Fetch Worker: one outbound GET bound to a batch deadline.

use reqwest::Client;
use url::Url;

use crate::fetch::deadline::Deadline;
use crate::fetch::error::FetchError;
use crate::fetch::types::FetchResult;
use crate::observability::metrics;

/// Fetch `url` and read its whole body before `deadline`.
///
/// Always yields exactly one [`FetchResult`]; every failure, including
/// deadline expiry and batch cancellation, becomes a failure result. Any HTTP
/// status is a successful fetch, the body is returned as-is.
pub async fn fetch(client: &Client, url: &str, deadline: &Deadline) -> FetchResult {
    match fetch_body(client, url, deadline).await {
        Ok(body) => {
            tracing::debug!(url = %url, bytes = body.len(), "Fetch succeeded");
            metrics::record_fetch("success");
            FetchResult::success(url, body)
        }
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Fetch failed");
            metrics::record_fetch(e.kind());
            FetchResult::failure(url, e)
        }
    }
}

async fn fetch_body(client: &Client, url: &str, deadline: &Deadline) -> Result<String, FetchError> {
    let target = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    deadline
        .run(async {
            let response = client.get(target).send().await.map_err(FetchError::from_send)?;
            let bytes = response.bytes().await.map_err(FetchError::from_body)?;
            Ok::<_, FetchError>(String::from_utf8_lossy(&bytes).into_owned())
        })
        .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accept one connection, read the request head, then reply with `raw`.
    async fn serve_once(raw: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(raw.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}/", addr)
    }

    fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 27\r\nConnection: close\r\n\r\n{\"message\": \"test success\"}",
        )
        .await;
        let result = fetch(&client(), &url, &Deadline::after(Duration::from_secs(5))).await;

        assert_eq!(result.url, url);
        assert_eq!(result.body(), Some("{\"message\": \"test success\"}"));
        assert_eq!(result.error(), None);
    }

    #[tokio::test]
    async fn test_non_2xx_status_is_still_data() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
        )
        .await;
        let result = fetch(&client(), &url, &Deadline::after(Duration::from_secs(5))).await;
        assert_eq!(result.body(), Some("not found"));
    }

    #[tokio::test]
    async fn test_malformed_url() {
        let result = fetch(
            &client(),
            "http://[invalid-url",
            &Deadline::after(Duration::from_secs(5)),
        )
        .await;
        let error = result.error().unwrap();
        assert!(error.contains("invalid"), "unexpected error: {error}");
        assert_eq!(result.body(), None);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = fetch(
            &client(),
            &format!("http://{}/", addr),
            &Deadline::after(Duration::from_secs(5)),
        )
        .await;
        assert!(!result.error().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_body_cut_short() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial",
        )
        .await;
        let result = fetch(&client(), &url, &Deadline::after(Duration::from_secs(5))).await;
        assert!(!result.error().unwrap().is_empty());
        assert_eq!(result.body(), None);
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and hold the connection without ever answering.
            if let Ok((socket, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(10)).await;
                drop(socket);
            }
        });

        let result = fetch(
            &client(),
            &format!("http://{}/", addr),
            &Deadline::after(Duration::from_millis(100)),
        )
        .await;
        assert!(result.error().unwrap().contains("deadline exceeded"));
    }

    #[tokio::test]
    async fn test_cancelled_worker_still_reports() {
        let deadline = Deadline::after(Duration::from_secs(30));
        deadline.cancel();
        let result = fetch(&client(), "http://127.0.0.1:9/", &deadline).await;
        assert!(result.error().unwrap().contains("cancelled"));
    }
}
