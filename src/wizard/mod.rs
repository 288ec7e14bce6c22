//! Three-step report wizard.
//!
//! # Data Flow
//! ```text
//! POST /api/sessions                 → store.rs (new session, ShopInfo)
//! POST /api/sessions/{id}/shop-info  → session.rs (validate, DataInput)
//! POST /api/sessions/{id}/data       → session.rs (validate + warnings, Generating)
//!                                    → report generator (outside the session lock)
//!                                    → session.rs (Report, or back to DataInput on failure)
//! ```

pub mod session;
pub mod store;

pub use session::{DataSubmission, Step, WizardError, WizardSession};
pub use store::SessionStore;
