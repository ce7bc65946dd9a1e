//! Local endpoints to point the fetcher at by hand.
//!
//! `/fast` answers immediately, `/slow` after 10 seconds (past the default
//! batch deadline).

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/fast", get(|| async { r#"{"server": "fast"}"# }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                r#"{"server": "slow"}"#
            }),
        );

    let addr = SocketAddr::from(([127, 0, 0, 1], 8081));
    println!("Mock backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
