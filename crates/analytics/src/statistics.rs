use crate::error::AnalyticsError;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Population statistics (denominator N) over a numeric sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Standard scores of a sample, one per input value in input order.
///
/// When the sample has zero variance every score is `None` and so is every
/// summary field; nothing is computed over the undefined scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreResult {
    pub z_scores: Vec<Option<f64>>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ZScoreResult {
    pub fn is_defined(&self) -> bool {
        self.z_scores.iter().all(Option::is_some)
    }
}

/// First and second central moments of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Moments {
    pub count: usize,
    pub mean: f64,
    /// Sum of squared deviations from the mean.
    pub m2: f64,
    pub min: Decimal,
    pub max: Decimal,
}

impl Moments {
    /// Two-pass computation: the mean is accumulated exactly in `Decimal`
    /// and the squared deviations are then summed around it, which avoids
    /// the cancellation of a naive sum-of-squares.
    pub(crate) fn of(samples: &[Decimal], context: &str) -> Result<Self, AnalyticsError> {
        let (first, rest) = samples
            .split_first()
            .ok_or_else(|| AnalyticsError::EmptySample(context.to_string()))?;

        let mut sum = *first;
        let (mut min, mut max) = (*first, *first);
        for value in rest {
            sum = sum
                .checked_add(*value)
                .ok_or_else(|| AnalyticsError::Calculation(format!("sum of {context} overflowed")))?;
            min = min.min(*value);
            max = max.max(*value);
        }

        let count = samples.len();
        let mean_exact = sum / Decimal::from(count);
        let mean = to_f64(mean_exact)?;

        // A constant sample must report exactly zero spread.
        let m2 = if min == max {
            0.0
        } else {
            samples
                .iter()
                .map(|value| to_f64(*value - mean_exact).map(|d| d * d))
                .sum::<Result<f64, AnalyticsError>>()?
        };

        Ok(Self { count, mean, m2, min, max })
    }

    pub(crate) fn population_variance(&self) -> f64 {
        self.m2 / self.count as f64
    }

    /// Unbiased variance (denominator N - 1); `None` below two samples.
    pub(crate) fn sample_variance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.m2 / (self.count - 1) as f64)
    }

    pub(crate) fn is_constant(&self) -> bool {
        self.min == self.max
    }
}

/// A stateless calculator for descriptive statistics, z-scores and
/// percentage change.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticsEngine {}

impl StatisticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean, population standard deviation, min and max of `samples`.
    ///
    /// # Errors
    ///
    /// `EmptySample` when `samples` is empty.
    pub fn describe(&self, samples: &[Decimal]) -> Result<DescriptiveStats, AnalyticsError> {
        let moments = Moments::of(samples, "describe")?;
        let min = to_f64(moments.min)?;
        let max = to_f64(moments.max)?;

        Ok(DescriptiveStats {
            count: moments.count,
            // Rounding in the f64 conversion must not push the mean outside [min, max].
            mean: moments.mean.clamp(min, max),
            std: moments.population_variance().sqrt(),
            min,
            max,
        })
    }

    /// `(x - mean) / std` for every sample, using the population std.
    pub fn z_scores(&self, samples: &[Decimal]) -> Result<ZScoreResult, AnalyticsError> {
        let moments = Moments::of(samples, "z-scores")?;

        if moments.is_constant() {
            tracing::debug!(count = moments.count, "Zero-variance sample; z-scores are undefined.");
            return Ok(ZScoreResult {
                z_scores: vec![None; samples.len()],
                mean: None,
                std_dev: None,
                min: None,
                max: None,
            });
        }

        let std = moments.population_variance().sqrt();
        let scores = samples
            .iter()
            .map(|value| to_f64(*value).map(|x| (x - moments.mean) / std))
            .collect::<Result<Vec<f64>, AnalyticsError>>()?;

        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let std_dev = (scores.iter().map(|z| (z - mean) * (z - mean)).sum::<f64>() / n).sqrt();
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(ZScoreResult {
            z_scores: scores.into_iter().map(Some).collect(),
            mean: Some(mean),
            std_dev: Some(std_dev),
            min: Some(min),
            max: Some(max),
        })
    }

    /// `(new - old) / old * 100` rounded half away from zero to two places.
    ///
    /// Undefined (`None`) when either operand is missing or `old` is zero.
    pub fn percentage_change(&self, old: Option<Decimal>, new: Option<Decimal>) -> Option<f64> {
        let (old, new) = (old?, new?);
        if old.is_zero() {
            return None;
        }
        let change = (new - old).checked_div(old)? * Decimal::ONE_HUNDRED;
        change
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
    }
}

fn to_f64(value: Decimal) -> Result<f64, AnalyticsError> {
    value
        .to_f64()
        .ok_or_else(|| AnalyticsError::Calculation(format!("{value} is not representable as f64")))
}
