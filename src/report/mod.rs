//! Report output rendering.
//!
//! # Data Flow
//! ```text
//! model output → strip fences → extract / convert → sanitize → display
//!                                                        │
//!                                                        ├─→ download (standalone document)
//!                                                        └─→ print (standalone document + print script)
//! ```

pub mod clean;
pub mod export;
pub mod generator;
pub mod sanitize;

pub use export::{download_document, download_document_on, print_document, ExportedFile};
pub use generator::ReportGenerator;
pub use sanitize::sanitize_report_html;

/// Normalize raw model output and sanitize it for display.
pub fn clean_report_html(raw: &str) -> String {
    sanitize_report_html(&clean::normalize_report(raw))
}
