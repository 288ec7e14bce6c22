//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Report generation attempt:
//!     → timeouts.rs (every upstream attempt has a deadline)
//!     → On failure: retries.rs (check attempts left, error retryable)
//!     → backoff.rs (wait before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Attempts are bounded and sequential, never concurrent
//! - Local configuration errors are never retried

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::RetryPolicy;
pub use timeouts::{with_deadline, DeadlineExceeded};
