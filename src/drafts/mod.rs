//! Server-side form drafts.
//!
//! Keeps partially filled forms between visits under string keys. Values are
//! arbitrary JSON.

pub mod store;

pub use store::{DraftError, DraftStore};

/// Prefix of the keys the report form writes.
pub const FORM_KEY_PREFIX: &str = "reportForm_";
