//! Restaurant weekly report library.
//!
//! Collects a shop's weekly operation data, validates it, asks a
//! chat-completion model for an HTML report and serves the sanitized result.

pub mod config;
pub mod drafts;
pub mod http;
pub mod lifecycle;
pub mod llm;
pub mod model;
pub mod observability;
pub mod prompt;
pub mod report;
pub mod resilience;
pub mod security;
pub mod validation;
pub mod wizard;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
