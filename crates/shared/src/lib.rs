//! # milvus-client-shared
//!
//! Foundational types shared by every crate in the Milvus client workspace:
//!
//! - Result and error envelope types
//! - Request context with correlation ids and cooperative cancellation
//! - Deadline helper for one-shot calls
//! - The poll-until-done driver used for long-running server operations
//!
//! This crate has no workspace dependencies.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod concurrency;
pub mod errors;
pub mod poll;
pub mod result;
pub mod timeout;

pub use concurrency::{CancellationToken, CorrelationId, RequestContext};
pub use errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use poll::{
    DEFAULT_POLL_INTERVAL, PollOptions, PollStep, poll_until, poll_until_with_progress,
};
pub use result::Result;
pub use timeout::timeout_with_context;

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
