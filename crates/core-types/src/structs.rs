use crate::enums::GroupLabel;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single paid invoice line, as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub user_id: i64,
    pub paid_at: NaiveDate,
    pub event_id: i64,
    pub amount: Decimal,
    pub product_name: String,
}

/// Assignment of one user to an experiment group via the two change flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAssignment {
    pub user_id: i64,
    pub ui_change: bool,
    pub desc_change: bool,
}

impl GroupAssignment {
    pub fn group(&self) -> GroupLabel {
        GroupLabel::from_flags(self.ui_change, self.desc_change)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSalesSummary {
    pub product_name: String,
    pub total_sales: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSalesSummary {
    pub event_id: i64,
    pub total_sales: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSalesSummary {
    pub group: GroupLabel,
    pub total_sales: Decimal,
}

/// Purchase count and revenue for one calendar month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPurchases {
    pub month: String,
    pub purchases: i64,
    pub total_sales: Decimal,
}

/// Average purchase amount for one combination of the experiment flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAverage {
    pub group: GroupLabel,
    pub ui_change: bool,
    pub desc_change: bool,
    pub purchases: i64,
    pub average_purchase: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariantAverage {
    pub product_name: String,
    pub group: GroupLabel,
    pub ui_change: bool,
    pub desc_change: bool,
    pub purchases: i64,
    pub average_purchase: Decimal,
}
