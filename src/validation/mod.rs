//! Form validation.
//!
//! # Data Flow
//! ```text
//! submitted form
//!     → rules.rs (structural checks: required, length, format, ranges)
//!         failures are hard errors keyed by JSON path
//!     → business.rs (cross-field consistency checks)
//!         failures are warnings the user must acknowledge
//! ```
//!
//! # Design Decisions
//! - Every failure is collected, never just the first
//! - Warnings do not block generation once acknowledged

pub mod business;
pub mod rules;

pub use business::business_warnings;
pub use rules::{
    validate_adjustment_data, validate_operation_data, validate_period_data,
    validate_promotion_data, validate_report, validate_shop_info, FieldError, ValidationErrors,
};
