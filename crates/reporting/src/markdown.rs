use crate::format::{number, percent, section, yes_no, NOT_AVAILABLE};
use analytics::{DescriptiveStats, Report, TTestResult, ZScoreResult};
use std::fmt::Write;

/// Renders the full report as a Markdown document.
///
/// Every section is always present; sections without a value carry a
/// placeholder line instead of being omitted.
pub fn render_markdown(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("# Summary Report\n\n");
    let _ = writeln!(out, "Report `{}` generated at {}.\n", report.report_id, report.generated_at.to_rfc3339());

    out.push_str("## Exploratory Data Analysis\n\n");

    out.push_str("### Product Sales Summary\n");
    out.push_str(&section(&report.product_sales, |rows| {
        rows.iter()
            .map(|r| format!("- Product: {}, Total Sales: {}\n", r.product_name, r.total_sales))
            .collect()
    }));

    out.push_str("\n### Event Sales Summary\n");
    out.push_str(&section(&report.event_sales, |rows| {
        rows.iter()
            .map(|r| format!("- Event ID: {}, Total Sales: {}\n", r.event_id, r.total_sales))
            .collect()
    }));

    out.push_str("\n### Group Sales Summary\n");
    out.push_str(&section(&report.group_sales, |rows| {
        rows.iter()
            .map(|r| format!("- Group: {}, Total Sales: {}\n", r.group, r.total_sales))
            .collect()
    }));

    out.push_str("\n### Monthly Purchases\n");
    out.push_str(&section(&report.monthly_purchases, |rows| {
        rows.iter()
            .map(|r| format!("- {}: {} purchases, Total Sales: {}\n", r.month, r.purchases, r.total_sales))
            .collect()
    }));

    out.push_str("\n### Product Sales Statistics\n");
    out.push_str(&section(&report.sales_statistics, stats_lines));
    out.push_str(&section(&report.z_scores, z_score_lines));

    out.push_str("\n## Experiment Comparison\n\n");

    out.push_str("### Sales Statistics by Group\n");
    for entry in &report.group_statistics {
        let _ = writeln!(out, "#### Group {}", entry.group);
        out.push_str(&section(&entry.stats, stats_lines));
    }

    out.push_str("\n### Percentage Changes in Sales\n");
    out.push_str(&section(&report.percentage_changes, |changes| {
        changes
            .entries()
            .iter()
            .map(|(group, change)| format!("- Change from A to {}: {}\n", group, percent(*change)))
            .collect()
    }));

    out.push_str("\n### Average Purchase Amount by UI and Description Change\n");
    out.push_str(&section(&report.variant_averages, |rows| {
        rows.iter()
            .map(|r| {
                format!(
                    "- Group {} (UI change: {}, Description change: {}): {} purchases, Average Purchase: {}\n",
                    r.group,
                    yes_no(r.ui_change),
                    yes_no(r.desc_change),
                    r.purchases,
                    r.average_purchase
                )
            })
            .collect()
    }));

    out.push_str("\n### Average Purchase Amount by Product, UI, and Description Change\n");
    out.push_str(&section(&report.product_variant_averages, |rows| {
        rows.iter()
            .map(|r| {
                format!(
                    "- Product: {}, Group {} (UI change: {}, Description change: {}): Average Purchase: {}\n",
                    r.product_name,
                    r.group,
                    yes_no(r.ui_change),
                    yes_no(r.desc_change),
                    r.average_purchase
                )
            })
            .collect()
    }));

    out.push_str("\n## T-Test Results for All Group Comparisons\n");
    let _ = writeln!(out, "Welch's t-test (unequal variances), alpha = {}.\n", report.significance_level);
    out.push_str(&section(&report.t_tests, |results| {
        results
            .iter()
            .map(|r| t_test_lines(r, report.significance_level))
            .collect()
    }));

    out
}

fn stats_lines(stats: &DescriptiveStats) -> String {
    format!(
        "- Count: {}\n- Mean: {:.2}\n- Std Dev: {:.2}\n- Min: {:.2}\n- Max: {:.2}\n",
        stats.count, stats.mean, stats.std, stats.min, stats.max
    )
}

fn z_score_lines(z: &ZScoreResult) -> String {
    format!(
        "- Z Score mean: {}\n- Z Score std dev: {}\n- Z Score min: {}\n- Z Score max: {}\n",
        number(z.mean, 4),
        number(z.std_dev, 4),
        number(z.min, 4),
        number(z.max, 4)
    )
}

fn t_test_lines(result: &TTestResult, alpha: f64) -> String {
    let verdict = match result.is_significant(alpha) {
        Some(true) => "significant",
        Some(false) => "not significant",
        None => NOT_AVAILABLE,
    };
    format!(
        "### T-test between groups {}\n- T-statistic: {}\n- P-value: {}\n- Degrees of freedom: {}\n- Result: {}\n\n",
        result.pair_label(),
        number(result.t_statistic, 4),
        number(result.p_value, 4),
        number(result.degrees_of_freedom, 2),
        verdict
    )
}
