use crate::format::{cell, number, percent};
use analytics::{Outcome, Report};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};
use core_types::GroupLabel;

/// Group comparison table: totals, per-group statistics and lift over A.
pub fn group_table(report: &Report) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Group", "Total Sales", "Sales", "Mean", "Std Dev", "Change vs A",
    ]);

    for group in GroupLabel::ALL {
        let total = report
            .group_sales
            .rows()
            .iter()
            .find(|r| r.group == group)
            .map(|r| r.total_sales.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        let (count, mean, std) = match report.group_statistics_for(group) {
            Some(stats) => (
                cell(stats, |s| s.count.to_string()),
                cell(stats, |s| format!("{:.2}", s.mean)),
                cell(stats, |s| format!("{:.2}", s.std)),
            ),
            None => ("N/A".to_string(), "N/A".to_string(), "N/A".to_string()),
        };

        let change = match group {
            GroupLabel::A => "baseline".to_string(),
            _ => cell(&report.percentage_changes, |changes| {
                let value = changes
                    .entries()
                    .iter()
                    .find(|(g, _)| *g == group)
                    .and_then(|(_, change)| *change);
                percent(value)
            }),
        };

        table.add_row(vec![
            Cell::new(group),
            Cell::new(total),
            Cell::new(count),
            Cell::new(mean),
            Cell::new(std),
            Cell::new(change),
        ]);
    }
    table
}

/// One row per group pair, or a single placeholder row.
pub fn t_test_table(report: &Report) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Pair", "t", "p-value", "df", "Significant"]);

    match &report.t_tests {
        Outcome::Ready(results) => {
            for r in results {
                let significant = match r.is_significant(report.significance_level) {
                    Some(true) => "yes",
                    Some(false) => "no",
                    None => "N/A",
                };
                table.add_row(vec![
                    r.pair_label(),
                    number(r.t_statistic, 4),
                    number(r.p_value, 4),
                    number(r.degrees_of_freedom, 2),
                    significant.to_string(),
                ]);
            }
        }
        Outcome::Empty => {
            table.add_row(vec!["-", "no data"]);
        }
        Outcome::Failed(failure) => {
            table.add_row(vec!["-", failure.message.as_str()]);
        }
    }
    table
}

/// Prints both tables to stdout.
pub fn print_summary(report: &Report) {
    println!("{}", group_table(report));
    println!("{}", t_test_table(report));
}
