use crate::outcome::Outcome;
use crate::significance::TTestResult;
use crate::statistics::{DescriptiveStats, ZScoreResult};
use chrono::{DateTime, Utc};
use core_types::{
    EventSalesSummary, GroupLabel, GroupSalesSummary, MonthlyPurchases, ProductSalesSummary,
    ProductVariantAverage, VariantAverage,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Percentage lift of each treatment group's total sales over group A.
/// A `None` field is undefined (zero or missing baseline, or missing group).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentageChanges {
    #[serde(rename = "B_A")]
    pub b_a: Option<f64>,
    #[serde(rename = "C_A")]
    pub c_a: Option<f64>,
    #[serde(rename = "D_A")]
    pub d_a: Option<f64>,
}

impl PercentageChanges {
    /// `(group, change vs A)` for B, C and D.
    pub fn entries(&self) -> [(GroupLabel, Option<f64>); 3] {
        [
            (GroupLabel::B, self.b_a),
            (GroupLabel::C, self.c_a),
            (GroupLabel::D, self.d_a),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStatistics {
    pub group: GroupLabel,
    pub stats: Outcome<DescriptiveStats>,
}

/// The complete result of one report run.
///
/// Built once by the `ReportAssembler` from a single snapshot of the store and
/// read-only afterwards. Each section is self-describing: presentation code
/// must render `Empty` and `Failed` sections as placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub significance_level: f64,

    // I. Sales summaries
    pub product_sales: Outcome<Vec<ProductSalesSummary>>,
    pub event_sales: Outcome<Vec<EventSalesSummary>>,
    pub group_sales: Outcome<Vec<GroupSalesSummary>>,
    pub monthly_purchases: Outcome<Vec<MonthlyPurchases>>,

    // II. Distribution of product totals
    pub sales_statistics: Outcome<DescriptiveStats>,
    pub z_scores: Outcome<ZScoreResult>,

    // III. Experiment comparison
    pub group_statistics: Vec<GroupStatistics>,
    pub percentage_changes: Outcome<PercentageChanges>,
    pub variant_averages: Outcome<Vec<VariantAverage>>,
    pub product_variant_averages: Outcome<Vec<ProductVariantAverage>>,
    pub t_tests: Outcome<Vec<TTestResult>>,
}

impl Report {
    pub fn group_statistics_for(&self, group: GroupLabel) -> Option<&Outcome<DescriptiveStats>> {
        self.group_statistics
            .iter()
            .find(|entry| entry.group == group)
            .map(|entry| &entry.stats)
    }

    pub fn t_test(&self, group1: GroupLabel, group2: GroupLabel) -> Option<&TTestResult> {
        self.t_tests
            .rows()
            .iter()
            .find(|r| r.group1 == group1 && r.group2 == group2)
    }
}
