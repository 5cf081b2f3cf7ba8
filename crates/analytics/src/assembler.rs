use crate::aggregation::AggregationEngine;
use crate::error::AnalyticsError;
use crate::outcome::Outcome;
use crate::report::{GroupStatistics, PercentageChanges, Report};
use crate::significance::{SignificanceEngine, TTestResult};
use crate::statistics::StatisticsEngine;
use chrono::Utc;
use core_types::{GroupLabel, GroupSalesSummary, ProductSalesSummary};
use database::QueryExecutor;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Composes aggregation, statistics and significance testing into a `Report`.
///
/// The assembler never talks to the store directly. A unit that cannot be
/// computed is recorded as `Empty`/`Failed` in the report; only structural
/// errors (an unknown query name) abort the run.
pub struct ReportAssembler<E> {
    aggregation: AggregationEngine<E>,
    statistics: StatisticsEngine,
    significance: SignificanceEngine,
    significance_level: f64,
}

impl<E: QueryExecutor> ReportAssembler<E> {
    pub fn new(aggregation: AggregationEngine<E>, significance_level: f64) -> Self {
        Self {
            aggregation,
            statistics: StatisticsEngine::new(),
            significance: SignificanceEngine::new(),
            significance_level,
        }
    }

    pub fn aggregation(&self) -> &AggregationEngine<E> {
        &self.aggregation
    }

    /// Runs every analysis unit in sequence and returns the merged report.
    pub async fn assemble(&self) -> Result<Report, AnalyticsError> {
        tracing::info!("Assembling report...");

        let product_sales = self.aggregation.product_sales().await?;
        let event_sales = self.aggregation.event_sales().await?;
        let group_sales = self.aggregation.group_sales().await?;
        let monthly_purchases = self.aggregation.monthly_purchases().await?;
        let variant_averages = self.aggregation.variant_averages().await?;
        let product_variant_averages = self.aggregation.product_variant_averages().await?;

        let product_totals = product_sales.derive(|rows| Ok(totals(rows)));
        let sales_statistics = product_totals.derive(|totals| self.statistics.describe(totals));
        let z_scores = product_totals.derive(|totals| self.statistics.z_scores(totals));

        let mut group_samples = BTreeMap::new();
        for group in GroupLabel::ALL {
            group_samples.insert(group, self.aggregation.raw_amounts_for_group(group).await?);
        }
        let group_statistics = GroupLabel::ALL
            .into_iter()
            .map(|group| GroupStatistics {
                group,
                stats: group_samples[&group].derive(|samples| self.statistics.describe(samples)),
            })
            .collect();

        let percentage_changes = group_sales.derive(|rows| Ok(self.percentage_changes(rows)));
        let t_tests = self.t_tests(&group_samples);

        let report = Report {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            significance_level: self.significance_level,
            product_sales,
            event_sales,
            group_sales,
            monthly_purchases,
            sales_statistics,
            z_scores,
            group_statistics,
            percentage_changes,
            variant_averages,
            product_variant_averages,
            t_tests,
        };

        tracing::info!(report_id = %report.report_id, "Report assembled.");
        Ok(report)
    }

    /// Lift of B, C and D over A, resolved by label rather than row position.
    fn percentage_changes(&self, rows: &[GroupSalesSummary]) -> PercentageChanges {
        let total = |group: GroupLabel| rows.iter().find(|r| r.group == group).map(|r| r.total_sales);
        let baseline = total(GroupLabel::A);

        PercentageChanges {
            b_a: self.statistics.percentage_change(baseline, total(GroupLabel::B)),
            c_a: self.statistics.percentage_change(baseline, total(GroupLabel::C)),
            d_a: self.statistics.percentage_change(baseline, total(GroupLabel::D)),
        }
    }

    fn t_tests(&self, group_samples: &BTreeMap<GroupLabel, Outcome<Vec<Decimal>>>) -> Outcome<Vec<TTestResult>> {
        // A failed sample query makes the whole significance unit unavailable.
        if let Some(failure) = group_samples.values().find_map(Outcome::failure) {
            tracing::warn!(error = %failure.message, "Skipping significance tests.");
            return Outcome::Failed(failure.clone());
        }

        let samples: BTreeMap<GroupLabel, Vec<Decimal>> = group_samples
            .iter()
            .map(|(group, outcome)| (*group, outcome.rows().to_vec()))
            .collect();

        let outcome = Outcome::from_result(self.significance.pairwise_t_tests(&samples));
        if let Some(failure) = outcome.failure() {
            tracing::warn!(error = %failure.message, "Significance tests unavailable.");
        }
        outcome
    }
}

fn totals(rows: &[ProductSalesSummary]) -> Vec<Decimal> {
    rows.iter().map(|r| r.total_sales).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::tests::{scripted_catalog, text, ScriptedExecutor};
    use crate::error::FailureKind;
    use crate::queries;
    use database::{Cell, Row};

    fn amounts(cents: &[i64]) -> Vec<Row> {
        cents.iter().map(|c| Row::new(vec![Cell::Integer(*c)])).collect()
    }

    fn group_totals(rows: &[(&str, i64)]) -> Vec<Row> {
        rows.iter()
            .map(|(label, cents)| Row::new(vec![text(label), Cell::Integer(*cents)]))
            .collect()
    }

    #[tokio::test]
    async fn failed_sections_do_not_abort_the_report() {
        // Only group sales and two groups' amounts are scripted; everything else fails.
        let executor = ScriptedExecutor::default()
            .respond(queries::GROUP_SALES, group_totals(&[("C", 30_000), ("A", 10_000), ("B", 15_000)]))
            .respond(queries::GROUP_A_AMOUNTS, amounts(&[10_000]))
            .respond(queries::GROUP_B_AMOUNTS, amounts(&[15_000]));
        let assembler = ReportAssembler::new(AggregationEngine::new(scripted_catalog(), executor), 0.05);

        let report = assembler.assemble().await.unwrap();

        assert_eq!(report.product_sales.failure().map(|f| f.kind), Some(FailureKind::QueryExecution));
        assert!(report.sales_statistics.is_failed());
        assert!(report.z_scores.is_failed());
        assert!(report.t_tests.is_failed());

        let changes = report.percentage_changes.ready().unwrap();
        assert_eq!(changes.b_a, Some(50.0));
        assert_eq!(changes.c_a, Some(200.0));
        assert_eq!(changes.d_a, None);

        assert!(report.group_statistics_for(GroupLabel::A).unwrap().is_ready());
        assert!(report.group_statistics_for(GroupLabel::C).unwrap().is_failed());
    }

    #[tokio::test]
    async fn missing_group_is_reported_by_name() {
        let executor = ScriptedExecutor::default()
            .respond(queries::GROUP_A_AMOUNTS, amounts(&[100, 200]))
            .respond(queries::GROUP_B_AMOUNTS, amounts(&[100, 300]))
            .respond(queries::GROUP_C_AMOUNTS, amounts(&[200, 400]))
            .respond(queries::GROUP_D_AMOUNTS, amounts(&[]));
        let assembler = ReportAssembler::new(AggregationEngine::new(scripted_catalog(), executor), 0.05);

        let report = assembler.assemble().await.unwrap();

        let failure = report.t_tests.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::MissingGroupData);
        assert_eq!(failure.groups, vec![GroupLabel::D]);
        assert!(report.group_statistics_for(GroupLabel::D).unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_baseline_leaves_changes_undefined() {
        let executor = ScriptedExecutor::default()
            .respond(queries::GROUP_SALES, group_totals(&[("A", 0), ("B", 500), ("D", 100)]));
        let assembler = ReportAssembler::new(AggregationEngine::new(scripted_catalog(), executor), 0.05);

        let report = assembler.assemble().await.unwrap();
        let changes = report.percentage_changes.ready().unwrap();
        assert_eq!((changes.b_a, changes.c_a, changes.d_a), (None, None, None));
    }
}
