//! Report prompt construction.
//!
//! Turns validated [`ReportData`](crate::model::ReportData) into the single
//! user message sent to the chat-completion endpoint.

pub mod template;

pub use template::{build_report_prompt, calculate_change};
