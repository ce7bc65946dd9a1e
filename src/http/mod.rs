//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, route table, middleware)
//!     → request.rs (assign / propagate X-Request-ID)
//!     → handlers.rs (method check, JSON decode, dispatch to fetch engine)
//!     → response.rs (batch-level errors → 4xx plain text)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
