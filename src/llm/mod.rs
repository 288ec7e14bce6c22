//! Chat-completion client used for report generation.
//!
//! # Data Flow
//! ```text
//! ReportData
//!     → prompt::build_report_prompt
//!     → client.rs (POST with bearer auth, bounded retries, per-attempt deadline)
//!     → types.rs (choices[0].message.content)
//!     → ApiResponse { success, data | error }
//! ```
//!
//! # Security Constraints
//! - The API key comes from configuration or the environment, never from code
//! - The API key is never logged

pub mod client;
pub mod error;
pub mod types;

pub use client::ReportClient;
pub use error::LlmError;
