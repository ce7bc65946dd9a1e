//! Concurrent URL fetcher library.
//!
//! Accepts a batch of URLs over HTTP, fetches them concurrently under one
//! shared deadline and returns every outcome, success or failure, as a JSON
//! array.

pub mod config;
pub mod fetch;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::FetcherConfig;
pub use fetch::{dispatch, FetchOutcome, FetchRequest, FetchResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
