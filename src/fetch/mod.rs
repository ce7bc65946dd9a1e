//! Concurrent fetch engine.
//!
//! # Data Flow
//! ```text
//! FetchRequest (urls)
//!     → coordinator.rs (precondition check, one Deadline per batch)
//!     → worker.rs × N (one task per URL, bound to the Deadline)
//!     → coordinator.rs (join barrier, slot per input index)
//!     → FetchResultSet (len == urls.len())
//!
//! Batch states:
//!     Pending → Collecting → Complete
//! ```
//!
//! # Design Decisions
//! - Settle-all: a failed URL never aborts the batch
//! - Per-URL failures are data (`FetchOutcome::Failure`), not errors
//! - No worker pool: concurrency equals the number of URLs in the batch

pub mod coordinator;
pub mod deadline;
pub mod error;
pub mod types;
pub mod worker;

pub use coordinator::{dispatch, BatchState, BatchTracker};
pub use deadline::Deadline;
pub use error::{FetchError, RequestError};
pub use types::{FetchOutcome, FetchRequest, FetchResult, FetchResultSet};
pub use worker::fetch;
