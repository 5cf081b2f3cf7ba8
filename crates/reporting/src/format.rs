use analytics::Outcome;

pub(crate) const NO_DATA: &str = "No data available.";
pub(crate) const NOT_AVAILABLE: &str = "N/A";

/// Renders a section body, or its placeholder when the section has no value.
pub(crate) fn section<T>(outcome: &Outcome<T>, render: impl FnOnce(&T) -> String) -> String {
    match outcome {
        Outcome::Ready(value) => render(value),
        Outcome::Empty => format!("{NO_DATA}\n"),
        Outcome::Failed(failure) => format!("Unavailable: {}\n", failure.message),
    }
}

/// Short placeholder for table cells.
pub(crate) fn cell<T>(outcome: &Outcome<T>, render: impl FnOnce(&T) -> String) -> String {
    match outcome {
        Outcome::Ready(value) => render(value),
        Outcome::Empty => "no data".to_string(),
        Outcome::Failed(_) => "unavailable".to_string(),
    }
}

pub(crate) fn number(value: Option<f64>, places: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.places$}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub(crate) fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}%"),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_numbers_render_as_na() {
        assert_eq!(number(None, 2), "N/A");
        assert_eq!(number(Some(f64::NAN), 2), "N/A");
        assert_eq!(number(Some(1.23456), 3), "1.235");
        assert_eq!(percent(Some(-4.5)), "-4.50%");
        assert_eq!(percent(None), "N/A");
    }
}
