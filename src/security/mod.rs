//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → body limit (tower-http, configured in http::server)
//!     → handler
//!     → headers.rs (security response headers)
//! ```
//!
//! # Design Decisions
//! - Generated report HTML is sanitized before it is stored or served
//! - No trust in client input

pub mod headers;

pub use headers::with_security_headers;
