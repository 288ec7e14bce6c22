//! Report data model.
//!
//! # Data Flow
//! ```text
//! form JSON (camelCase)
//!     → types.rs (ShopInfo, OperationData, PromotionData)
//!     → adjustment.rs (shop adjustment checklist)
//!     → ReportData (input to validation, prompt and llm)
//! ```

pub mod adjustment;
pub mod number;
pub mod types;

pub use adjustment::{AdjustmentData, AdjustmentOption};
pub use number::to_fixed;
pub use types::{
    ApiResponse, OperationData, PeriodData, PromotionData, PromotionPeriod, ReportData, ShopInfo,
    WeeklyGrowth,
};
