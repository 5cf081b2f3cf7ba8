//! End-to-end: a real in-memory SQLite store, the bundled query catalog, and
//! the full report assembly.

use analytics::{
    AggregationEngine, FailureKind, ReportAssembler, SignificanceEngine, StatisticsEngine,
};
use chrono::NaiveDate;
use core_types::{GroupAssignment, GroupLabel, SalesRecord};
use database::{connect_in_memory, run_migrations, QueryCatalog, SalesRepository};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn sale(user_id: i64, event_id: i64, amount: Decimal, product: &str, day: u32) -> SalesRecord {
    SalesRecord {
        user_id,
        paid_at: NaiveDate::from_ymd_opt(2020, 5 + day % 3, 1 + day % 28).unwrap(),
        event_id,
        amount,
        product_name: product.to_string(),
    }
}

/// Users 1-4 are in group A, 5-8 in group B, user 99 is unassigned.
/// Groups C and D have no users.
async fn seeded_store() -> SalesRepository {
    let pool = connect_in_memory().await.unwrap();
    run_migrations(&pool).await.unwrap();
    let repo = SalesRepository::new(pool);

    let sales = vec![
        sale(1, 10, dec!(100), "Tickets", 1),
        sale(5, 10, dec!(150), "Tickets", 2),
        sale(2, 11, dec!(200), "Merch", 3),
        sale(6, 11, dec!(250), "Merch", 4),
        sale(3, 10, dec!(300), "Tickets", 5),
        sale(7, 12, dec!(350), "Parking", 6),
        sale(4, 12, dec!(400), "Parking", 7),
        sale(8, 10, dec!(450), "Tickets", 8),
        sale(99, 12, dec!(5000), "Parking", 9),
    ];
    repo.replace_sales(&sales).await.unwrap();

    let mut assignments = Vec::new();
    for user_id in 1..=4 {
        assignments.push(GroupAssignment { user_id, ui_change: false, desc_change: false });
    }
    for user_id in 5..=8 {
        assignments.push(GroupAssignment { user_id, ui_change: false, desc_change: true });
    }
    repo.replace_assignments(&assignments).await.unwrap();

    repo
}

async fn engine() -> AggregationEngine<SalesRepository> {
    AggregationEngine::new(QueryCatalog::bundled().unwrap(), seeded_store().await)
}

#[tokio::test]
async fn bundled_catalog_matches_declared_projections() {
    engine().await.verify().await.unwrap();
}

#[tokio::test]
async fn group_sales_exclude_unassigned_users() {
    let engine = engine().await;
    let groups = engine.group_sales().await.unwrap();

    let rows = groups.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].group, rows[0].total_sales), (GroupLabel::A, dec!(1000.00)));
    assert_eq!((rows[1].group, rows[1].total_sales), (GroupLabel::B, dec!(1200.00)));
}

#[tokio::test]
async fn group_a_statistics_and_ab_test() {
    let engine = engine().await;
    let a = engine.raw_amounts_for_group(GroupLabel::A).await.unwrap();
    let b = engine.raw_amounts_for_group(GroupLabel::B).await.unwrap();
    assert_eq!(a.rows(), &[dec!(100.00), dec!(200.00), dec!(300.00), dec!(400.00)]);

    let stats = StatisticsEngine::new().describe(a.rows()).unwrap();
    assert!((stats.mean - 250.0).abs() < 1e-9);
    assert!((stats.std - 111.80).abs() < 0.01);
    assert_eq!((stats.min, stats.max), (100.0, 400.0));

    let welch = SignificanceEngine::new()
        .welch_t_test(a.rows(), b.rows())
        .unwrap()
        .unwrap();
    assert!(welch.p_value > 0.05 && welch.p_value <= 1.0);
}

#[tokio::test]
async fn report_is_best_effort_when_groups_are_empty() {
    let assembler = ReportAssembler::new(engine().await, 0.05);
    let report = assembler.assemble().await.unwrap();

    let failure = report.t_tests.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::MissingGroupData);
    assert_eq!(failure.groups, vec![GroupLabel::C, GroupLabel::D]);

    assert!(report.group_statistics_for(GroupLabel::C).unwrap().is_empty());
    let changes = report.percentage_changes.ready().unwrap();
    assert_eq!(changes.b_a, Some(20.0));
    assert_eq!(changes.c_a, None);

    // Product totals include the unassigned user's purchase.
    let products = report.product_sales.rows();
    assert_eq!(products[0].product_name, "Parking");
    assert_eq!(products[0].total_sales, dec!(5750.00));
    assert!(report.sales_statistics.is_ready());
    assert_eq!(report.z_scores.ready().unwrap().z_scores.len(), products.len());

    let months: i64 = report.monthly_purchases.rows().iter().map(|m| m.purchases).sum();
    assert_eq!(months, 9);

    let variants = report.variant_averages.rows();
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].average_purchase, dec!(250.00));
    assert_eq!(variants[1].average_purchase, dec!(300.00));
}

#[tokio::test]
async fn rebuilding_from_unchanged_store_is_deterministic() {
    let assembler = ReportAssembler::new(engine().await, 0.05);
    let first = assembler.assemble().await.unwrap();
    let second = assembler.assemble().await.unwrap();

    assert_eq!(first.product_sales, second.product_sales);
    assert_eq!(first.event_sales, second.event_sales);
    assert_eq!(first.group_sales, second.group_sales);
    assert_ne!(first.report_id, second.report_id);
}

#[tokio::test]
async fn empty_store_yields_empty_sections() {
    let pool = connect_in_memory().await.unwrap();
    run_migrations(&pool).await.unwrap();
    let engine = AggregationEngine::new(QueryCatalog::bundled().unwrap(), SalesRepository::new(pool));
    let report = ReportAssembler::new(engine, 0.05).assemble().await.unwrap();

    assert!(report.product_sales.is_empty());
    assert!(report.event_sales.is_empty());
    assert!(report.group_sales.is_empty());
    assert!(report.sales_statistics.is_empty());
    assert!(report.percentage_changes.is_empty());
    assert_eq!(
        report.t_tests.failure().map(|f| f.groups.clone()),
        Some(GroupLabel::ALL.to_vec())
    );
}
