//! # Groupwise Core Types
//!
//! Layer 0 of the workspace: the plain data structures shared by ingestion,
//! persistence, analytics and presentation. No crate here knows about I/O.

pub mod enums;
pub mod error;
pub mod money;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::GroupLabel;
pub use error::CoreError;
pub use money::to_cents;
pub use structs::{
    EventSalesSummary, GroupAssignment, GroupSalesSummary, MonthlyPurchases, ProductSalesSummary,
    ProductVariantAverage, SalesRecord, VariantAverage,
};
