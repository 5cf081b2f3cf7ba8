use crate::error::AnalyticsError;
use crate::statistics::Moments;
use core_types::GroupLabel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::BTreeMap;

/// Welch's two-sample t-test between `group1` and `group2` (`group1 < group2`).
///
/// The statistics are `None` when the test is undefined for the pair: a group
/// with fewer than two samples, or both groups with zero variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    pub group1: GroupLabel,
    pub group2: GroupLabel,
    pub t_statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub degrees_of_freedom: Option<f64>,
}

impl TTestResult {
    /// `Some(p < alpha)`, or `None` when the p-value is undefined.
    pub fn is_significant(&self, alpha: f64) -> Option<bool> {
        self.p_value.map(|p| p < alpha)
    }

    pub fn pair_label(&self) -> String {
        format!("{}-{}", self.group1, self.group2)
    }
}

/// Pairwise significance testing across the experiment groups.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignificanceEngine {}

impl SignificanceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a Welch test for every unordered pair of groups, in the order
    /// (A,B), (A,C), (A,D), (B,C), (B,D), (C,D).
    ///
    /// # Errors
    ///
    /// `MissingGroupData` naming every group that is absent from
    /// `samples_by_group` or has no samples. No pair is skipped silently.
    pub fn pairwise_t_tests(
        &self,
        samples_by_group: &BTreeMap<GroupLabel, Vec<Decimal>>,
    ) -> Result<Vec<TTestResult>, AnalyticsError> {
        let missing: Vec<GroupLabel> = GroupLabel::ALL
            .into_iter()
            .filter(|group| samples_by_group.get(group).is_none_or(|s| s.is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(AnalyticsError::MissingGroupData(missing));
        }

        let mut moments = BTreeMap::new();
        for (group, samples) in samples_by_group {
            moments.insert(*group, Moments::of(samples, &format!("group {group}"))?);
        }

        GroupLabel::pairs()
            .into_iter()
            .map(|(group1, group2)| -> Result<TTestResult, AnalyticsError> {
                let result = welch(&moments[&group1], &moments[&group2])?;
                Ok(TTestResult {
                    group1,
                    group2,
                    t_statistic: result.map(|r| r.t_statistic),
                    p_value: result.map(|r| r.p_value),
                    degrees_of_freedom: result.map(|r| r.degrees_of_freedom),
                })
            })
            .collect()
    }

    /// Welch's test on two raw samples.
    pub fn welch_t_test(
        &self,
        first: &[Decimal],
        second: &[Decimal],
    ) -> Result<Option<WelchStatistics>, AnalyticsError> {
        let first = Moments::of(first, "first sample")?;
        let second = Moments::of(second, "second sample")?;
        welch(&first, &second)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchStatistics {
    pub t_statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
}

fn welch(first: &Moments, second: &Moments) -> Result<Option<WelchStatistics>, AnalyticsError> {
    let (Some(v1), Some(v2)) = (first.sample_variance(), second.sample_variance()) else {
        return Ok(None);
    };

    let (n1, n2) = (first.count as f64, second.count as f64);
    let (se1, se2) = (v1 / n1, v2 / n2);
    let se_squared = se1 + se2;
    if se_squared <= 0.0 {
        return Ok(None);
    }

    let t_statistic = (first.mean - second.mean) / se_squared.sqrt();
    // Welch–Satterthwaite approximation.
    let degrees_of_freedom =
        se_squared * se_squared / (se1 * se1 / (n1 - 1.0) + se2 * se2 / (n2 - 1.0));

    let distribution = StudentsT::new(0.0, 1.0, degrees_of_freedom).map_err(|e| {
        AnalyticsError::Calculation(format!("invalid t distribution (df = {degrees_of_freedom}): {e}"))
    })?;
    let p_value = (2.0 * distribution.sf(t_statistic.abs())).clamp(0.0, 1.0);

    Ok(Some(WelchStatistics {
        t_statistic,
        p_value,
        degrees_of_freedom,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn populated() -> BTreeMap<GroupLabel, Vec<Decimal>> {
        BTreeMap::from([
            (GroupLabel::A, vec![dec!(100), dec!(200), dec!(300), dec!(400)]),
            (GroupLabel::B, vec![dec!(150), dec!(250), dec!(350), dec!(450)]),
            (GroupLabel::C, vec![dec!(10), dec!(20), dec!(15)]),
            (GroupLabel::D, vec![dec!(900), dec!(950), dec!(1000), dec!(875)]),
        ])
    }

    #[test]
    fn covers_every_pair_once_in_fixed_order() {
        use GroupLabel::*;
        let results = SignificanceEngine::new().pairwise_t_tests(&populated()).unwrap();
        let pairs: Vec<(GroupLabel, GroupLabel)> =
            results.iter().map(|r| (r.group1, r.group2)).collect();
        assert_eq!(pairs, vec![(A, B), (A, C), (A, D), (B, C), (B, D), (C, D)]);
    }

    #[test]
    fn matched_spread_is_not_significant() {
        let results = SignificanceEngine::new().pairwise_t_tests(&populated()).unwrap();
        let ab = &results[0];

        let t = ab.t_statistic.unwrap();
        let p = ab.p_value.unwrap();
        assert!((t + 0.547_722_557_505_166).abs() < 1e-9);
        assert!((ab.degrees_of_freedom.unwrap() - 6.0).abs() < 1e-9);
        assert!(p > 0.05 && p <= 1.0);
        assert_eq!(ab.is_significant(0.05), Some(false));
    }

    #[test]
    fn separated_groups_are_significant() {
        let results = SignificanceEngine::new().pairwise_t_tests(&populated()).unwrap();
        let cd = results.last().unwrap();
        assert_eq!(cd.pair_label(), "C-D");
        assert!(cd.p_value.unwrap() < 0.001);
        assert!(cd.t_statistic.unwrap() < 0.0);
    }

    #[test]
    fn empty_group_fails_naming_it() {
        let mut samples = populated();
        samples.insert(GroupLabel::D, Vec::new());
        match SignificanceEngine::new().pairwise_t_tests(&samples) {
            Err(AnalyticsError::MissingGroupData(groups)) => assert_eq!(groups, vec![GroupLabel::D]),
            other => panic!("expected MissingGroupData, got {other:?}"),
        }
    }

    #[test]
    fn absent_groups_are_all_named() {
        let mut samples = populated();
        samples.remove(&GroupLabel::B);
        samples.remove(&GroupLabel::C);
        match SignificanceEngine::new().pairwise_t_tests(&samples) {
            Err(AnalyticsError::MissingGroupData(groups)) => {
                assert_eq!(groups, vec![GroupLabel::B, GroupLabel::C])
            }
            other => panic!("expected MissingGroupData, got {other:?}"),
        }
    }

    #[test]
    fn undefined_for_single_sample_or_zero_variance() {
        let engine = SignificanceEngine::new();
        assert_eq!(engine.welch_t_test(&[dec!(1)], &[dec!(1), dec!(2)]).unwrap(), None);
        assert_eq!(engine.welch_t_test(&[dec!(3), dec!(3)], &[dec!(5), dec!(5)]).unwrap(), None);

        // One constant group is still testable.
        let stats = engine
            .welch_t_test(&[dec!(3), dec!(3), dec!(3)], &[dec!(4), dec!(5), dec!(6)])
            .unwrap()
            .unwrap();
        assert!((stats.degrees_of_freedom - 2.0).abs() < 1e-9);
    }
}
