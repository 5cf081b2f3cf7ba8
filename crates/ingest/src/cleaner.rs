use crate::error::IngestError;
use crate::loader::{RawAssignment, RawInvoice};
use chrono::NaiveDate;
use configuration::DataSettings;
use core_types::{to_cents, GroupAssignment, SalesRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use std::str::FromStr;

/// How raw rows are validated and filtered before they reach the store.
#[derive(Debug, Clone)]
pub struct CleaningRules {
    pub date_format: String,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
}

impl CleaningRules {
    pub fn from_settings(settings: &DataSettings) -> Self {
        Self {
            date_format: settings.date_format.clone(),
            window_start: settings.analysis_start_date,
            window_end: settings.analysis_end_date,
        }
    }

    fn in_window(&self, date: NaiveDate) -> bool {
        self.window_start.is_none_or(|start| date >= start)
            && self.window_end.is_none_or(|end| date <= end)
    }
}

impl Default for CleaningRules {
    fn default() -> Self {
        Self {
            date_format: "%m/%d/%Y".to_string(),
            window_start: None,
            window_end: None,
        }
    }
}

/// Per-file bookkeeping of what the cleaner kept and why it dropped the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningSummary {
    pub read: usize,
    pub kept: usize,
    pub dropped_incomplete: usize,
    pub dropped_unparseable: usize,
    pub dropped_out_of_window: usize,
}

enum Verdict<T> {
    Keep(T),
    Incomplete,
    Unparseable,
    OutOfWindow,
}

impl CleaningSummary {
    fn record<T>(&mut self, verdict: Verdict<T>, kept: &mut Vec<T>) {
        self.read += 1;
        match verdict {
            Verdict::Keep(value) => {
                self.kept += 1;
                kept.push(value);
            }
            Verdict::Incomplete => self.dropped_incomplete += 1,
            Verdict::Unparseable => self.dropped_unparseable += 1,
            Verdict::OutOfWindow => self.dropped_out_of_window += 1,
        }
    }
}

/// Validates invoice rows, keeping source order.
pub fn clean_invoices(
    rows: Vec<RawInvoice>,
    rules: &CleaningRules,
) -> (Vec<SalesRecord>, CleaningSummary) {
    let mut summary = CleaningSummary::default();
    let mut kept = Vec::with_capacity(rows.len());

    for row in rows {
        summary.record(clean_invoice(row, rules), &mut kept);
    }

    tracing::info!(
        read = summary.read,
        kept = summary.kept,
        incomplete = summary.dropped_incomplete,
        unparseable = summary.dropped_unparseable,
        out_of_window = summary.dropped_out_of_window,
        "Cleaned invoice data."
    );
    (kept, summary)
}

fn clean_invoice(row: RawInvoice, rules: &CleaningRules) -> Verdict<SalesRecord> {
    let (Some(user_id), Some(paid_at), Some(event_id), Some(amount), Some(product_name)) =
        (row.userid, row.datepaid, row.event_id, row.amount, row.product_name)
    else {
        return Verdict::Incomplete;
    };

    let parsed = (
        parse_id(&user_id),
        NaiveDate::parse_from_str(&paid_at, &rules.date_format).ok(),
        parse_id(&event_id),
        Decimal::from_str(&amount).ok().filter(|amount| to_cents(*amount).is_some()),
    );
    let (Some(user_id), Some(paid_at), Some(event_id), Some(amount)) = parsed else {
        tracing::debug!(user_id = %user_id, date = %paid_at, "Dropping unparseable invoice row.");
        return Verdict::Unparseable;
    };

    if !rules.in_window(paid_at) {
        return Verdict::OutOfWindow;
    }

    Verdict::Keep(SalesRecord {
        user_id,
        paid_at,
        event_id,
        amount,
        product_name,
    })
}

/// Validates assignment rows. A user that appears twice is a hard error,
/// since every user must resolve to exactly one group.
pub fn clean_assignments(
    rows: Vec<RawAssignment>,
) -> Result<(Vec<GroupAssignment>, CleaningSummary), IngestError> {
    let mut summary = CleaningSummary::default();
    let mut kept = Vec::with_capacity(rows.len());

    for row in rows {
        summary.record(clean_assignment(row), &mut kept);
    }

    let mut seen = HashSet::with_capacity(kept.len());
    for assignment in &kept {
        if !seen.insert(assignment.user_id) {
            return Err(IngestError::DuplicateAssignment(assignment.user_id));
        }
    }

    tracing::info!(
        read = summary.read,
        kept = summary.kept,
        incomplete = summary.dropped_incomplete,
        unparseable = summary.dropped_unparseable,
        "Cleaned group assignment data."
    );
    Ok((kept, summary))
}

fn clean_assignment(row: RawAssignment) -> Verdict<GroupAssignment> {
    let (Some(user_id), Some(ui_change), Some(desc_change)) = (row.userid, row.ui_change, row.desc_change)
    else {
        return Verdict::Incomplete;
    };

    match (parse_id(&user_id), parse_flag(&ui_change), parse_flag(&desc_change)) {
        (Some(user_id), Some(ui_change), Some(desc_change)) => Verdict::Keep(GroupAssignment {
            user_id,
            ui_change,
            desc_change,
        }),
        _ => Verdict::Unparseable,
    }
}

/// Accepts plain integers and the `123.0` form produced by spreadsheet exports.
fn parse_id(value: &str) -> Option<i64> {
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.strip_suffix(".0").and_then(|v| v.parse().ok()))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" | "y" => Some(true),
        "0" | "0.0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice(user: &str, date: &str, amount: &str) -> RawInvoice {
        RawInvoice {
            userid: Some(user.to_string()),
            datepaid: Some(date.to_string()),
            event_id: Some("3".to_string()),
            amount: Some(amount.to_string()),
            product_name: Some("Tickets".to_string()),
        }
    }

    #[test]
    fn drops_incomplete_and_unparseable_rows() {
        let rows = vec![
            invoice("1", "05/02/2020", "19.99"),
            RawInvoice { amount: None, ..invoice("2", "05/02/2020", "1") },
            invoice("3", "2020-05-02", "10"),
            invoice("4", "05/03/2020", "ten"),
        ];
        let (kept, summary) = clean_invoices(rows, &CleaningRules::default());

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].amount, dec!(19.99));
        assert_eq!(kept[0].paid_at, NaiveDate::from_ymd_opt(2020, 5, 2).unwrap());
        assert_eq!(
            summary,
            CleaningSummary {
                read: 4,
                kept: 1,
                dropped_incomplete: 1,
                dropped_unparseable: 2,
                dropped_out_of_window: 0,
            }
        );
    }

    #[test]
    fn amounts_without_an_exact_cent_value_are_unparseable() {
        let rows = vec![
            invoice("1", "05/02/2020", "19.990"),
            invoice("2", "05/02/2020", "19.999"),
            invoice("3", "05/02/2020", "79228162514264337593543950335"),
        ];
        let (kept, summary) = clean_invoices(rows, &CleaningRules::default());

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].amount, dec!(19.99));
        assert_eq!(summary.dropped_unparseable, 2);
    }

    #[test]
    fn applies_inclusive_analysis_window() {
        let rules = CleaningRules {
            window_start: NaiveDate::from_ymd_opt(2020, 5, 1),
            window_end: NaiveDate::from_ymd_opt(2020, 9, 1),
            ..CleaningRules::default()
        };
        let rows = vec![
            invoice("1", "04/30/2020", "1"),
            invoice("2", "05/01/2020", "1"),
            invoice("3", "09/01/2020", "1"),
            invoice("4", "09/02/2020", "1"),
        ];
        let (kept, summary) = clean_invoices(rows, &rules);

        let users: Vec<i64> = kept.iter().map(|r| r.user_id).collect();
        assert_eq!(users, vec![2, 3]);
        assert_eq!(summary.dropped_out_of_window, 2);
    }

    #[test]
    fn parses_flag_spellings() {
        let rows = vec![
            RawAssignment { userid: Some("1".into()), ui_change: Some("True".into()), desc_change: Some("0".into()) },
            RawAssignment { userid: Some("2.0".into()), ui_change: Some("no".into()), desc_change: Some("YES".into()) },
            RawAssignment { userid: Some("3".into()), ui_change: Some("maybe".into()), desc_change: Some("1".into()) },
        ];
        let (kept, summary) = clean_assignments(rows).unwrap();

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].group(), core_types::GroupLabel::C);
        assert_eq!(kept[1].user_id, 2);
        assert_eq!(kept[1].group(), core_types::GroupLabel::B);
        assert_eq!(summary.dropped_unparseable, 1);
    }

    #[test]
    fn duplicate_assignment_is_rejected() {
        let row = RawAssignment { userid: Some("9".into()), ui_change: Some("1".into()), desc_change: Some("1".into()) };
        assert!(matches!(
            clean_assignments(vec![row.clone(), row]),
            Err(IngestError::DuplicateAssignment(9))
        ));
    }
}
