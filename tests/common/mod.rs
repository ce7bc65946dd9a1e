//! Shared utilities for integration and load testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fanout_fetcher::config::FetcherConfig;
use fanout_fetcher::http::HttpServer;
use fanout_fetcher::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Read the request head so the peer never sees a reset on close.
async fn drain_request(socket: &mut TcpStream) {
    let mut buf = [0u8; 4096];
    let _ = socket.read(&mut buf).await;
}

/// Spawn an accept loop on an ephemeral port, handing each socket to `handle`.
async fn serve<F, Fut>(handle: F) -> SocketAddr
where
    F: Fn(TcpStream) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = Arc::new(handle);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handle = handle.clone();
                    tokio::spawn(async move { handle(socket).await });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

/// Start a mock backend that returns a fixed 200 response.
pub async fn start_mock_backend(response: &'static str) -> String {
    start_programmable_backend(move || async move { (200, response.to_string()) }).await
}

/// Start a programmable mock backend with async support.
pub async fn start_programmable_backend<F, Fut>(f: F) -> String
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let f = Arc::new(f);
    let addr = serve(move |mut socket| {
        let f = f.clone();
        async move {
            drain_request(&mut socket).await;
            let (status, body) = f().await;
            let status_text = match status {
                200 => "200 OK",
                404 => "404 Not Found",
                500 => "500 Internal Server Error",
                503 => "503 Service Unavailable",
                _ => "200 OK",
            };
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_text,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    })
    .await;
    format!("http://{}/", addr)
}

/// Start a backend that accepts connections but never answers.
#[allow(dead_code)]
pub async fn start_hanging_backend() -> String {
    let addr = serve(|mut socket| async move {
        drain_request(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(socket);
    })
    .await;
    format!("http://{}/", addr)
}

/// Start a backend that promises a body and closes the connection halfway.
#[allow(dead_code)]
pub async fn start_truncating_backend() -> String {
    let addr = serve(|mut socket| async move {
        drain_request(&mut socket).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\nConnection: close\r\n\r\n{\"partial\":")
            .await;
        let _ = socket.shutdown().await;
    })
    .await;
    format!("http://{}/", addr)
}

/// Start a backend that never answers and reports each connection the
/// client closes on the returned channel.
#[allow(dead_code)]
pub async fn start_close_reporting_backend() -> (String, mpsc::UnboundedReceiver<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let addr = serve(move |mut socket| {
        let tx = tx.clone();
        async move {
            drain_request(&mut socket).await;
            let mut buf = [0u8; 1024];
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
            }
            let _ = tx.send(());
        }
    })
    .await;
    (format!("http://{}/", addr), rx)
}

/// A URL nobody listens on.
#[allow(dead_code)]
pub async fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

/// Config suitable for tests: ephemeral port, no proxy from the environment.
pub fn test_config(timeout: Duration) -> FetcherConfig {
    let mut config = FetcherConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.fetch.timeout_ms = timeout.as_millis() as u64;
    config.fetch.use_env_proxy = false;
    config
}

/// Start the fetcher; returns its base URL and the shutdown handle.
pub async fn start_fetcher(config: FetcherConfig) -> (String, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, &shutdown).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    (format!("http://{}", addr), shutdown)
}

/// Plain reqwest client that bypasses any proxy settings.
#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
