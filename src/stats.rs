//! Descriptive statistics over a trial's samples
//!
//! Every reduction over zero samples is an [`Error::InvalidInput`]; callers never
//! see a silent `NaN` or `0.0` standing in for "no data".
//!
//! A `NaN` sample poisons every statistic: if any sample is `NaN`, each
//! function here returns `NaN`.
//!
//! Percentiles use midpoint interpolation: the virtual index
//! `q / 100 * (n - 1)` is resolved to the mean of the two neighbouring order
//! statistics.

use crate::{Error, Result};

/// Number of samples shown in a summary preview.
pub const PREVIEW_LEN: usize = 10;

fn ensure_non_empty(samples: &[f64], op: &str) -> Result<()> {
    if samples.is_empty() {
        return Err(Error::InvalidInput(format!("{op} of an empty sample sequence")));
    }
    Ok(())
}

fn has_nan(samples: &[f64]) -> bool {
    samples.iter().any(|v| v.is_nan())
}

fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Sum of the samples.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `samples` is empty
pub fn sum(samples: &[f64]) -> Result<f64> {
    ensure_non_empty(samples, "sum")?;
    Ok(samples.iter().sum())
}

/// Arithmetic mean of the samples.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `samples` is empty
#[allow(clippy::cast_precision_loss)]
pub fn mean(samples: &[f64]) -> Result<f64> {
    ensure_non_empty(samples, "mean")?;
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Median of the samples (mean of the two middle values for even counts).
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `samples` is empty
pub fn median(samples: &[f64]) -> Result<f64> {
    ensure_non_empty(samples, "median")?;
    if has_nan(samples) {
        return Ok(f64::NAN);
    }
    let sorted = sorted(samples);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// `q`-th percentile (0..=100) with midpoint interpolation.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `samples` is empty or `q` is outside
/// `0..=100`
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile_midpoint(samples: &[f64], q: f64) -> Result<f64> {
    ensure_non_empty(samples, "percentile")?;
    if !(0.0..=100.0).contains(&q) {
        return Err(Error::InvalidInput(format!(
            "percentile must be within 0..=100, got {q}"
        )));
    }
    if has_nan(samples) {
        return Ok(f64::NAN);
    }

    let sorted = sorted(samples);
    let index = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    Ok((sorted[lower] + sorted[upper]) / 2.0)
}

/// Interquartile range (75th minus 25th percentile, midpoint interpolation).
///
/// A single sample has an interquartile range of `0.0`.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `samples` is empty
pub fn iqr(samples: &[f64]) -> Result<f64> {
    ensure_non_empty(samples, "interquartile range")?;
    Ok(percentile_midpoint(samples, 75.0)? - percentile_midpoint(samples, 25.0)?)
}

/// Largest sample.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `samples` is empty
pub fn max(samples: &[f64]) -> Result<f64> {
    ensure_non_empty(samples, "max")?;
    if has_nan(samples) {
        return Ok(f64::NAN);
    }
    Ok(samples.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Smallest sample.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `samples` is empty
pub fn min(samples: &[f64]) -> Result<f64> {
    ensure_non_empty(samples, "min")?;
    if has_nan(samples) {
        return Ok(f64::NAN);
    }
    Ok(samples.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Descriptive statistics of one (metric, trial) sample sequence.
///
/// All values are rounded to two decimal places.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSummary {
    /// First [`PREVIEW_LEN`] samples (fewer if the trial has fewer)
    pub preview: Vec<f64>,
    /// Arithmetic mean
    pub mean: f64,
    /// Median
    pub median: f64,
    /// Interquartile range
    pub iqr: f64,
    /// Largest sample
    pub max: f64,
    /// Smallest sample
    pub min: f64,
}

impl TrialSummary {
    /// Compute the summary of a trial's samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `samples` is empty
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        Ok(Self {
            preview: samples.iter().take(PREVIEW_LEN).copied().map(round2).collect(),
            mean: round2(mean(samples)?),
            median: round2(median(samples)?),
            iqr: round2(iqr(samples)?),
            max: round2(max(samples)?),
            min: round2(min(samples)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mean_and_sum() {
        assert!(approx(mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0));
        assert!(approx(sum(&[1.0, 2.0, 3.0]).unwrap(), 6.0));
    }

    #[test]
    fn test_empty_is_invalid_input() {
        for result in [sum(&[]), mean(&[]), median(&[]), iqr(&[]), max(&[]), min(&[])] {
            assert!(matches!(result, Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn test_median_even_and_odd() {
        assert!(approx(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0));
        assert!(approx(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5));
    }

    #[test]
    fn test_percentile_midpoint() {
        let samples = [1.0, 2.0, 3.0, 4.0];
        // index 0.75 -> (1 + 2) / 2
        assert!(approx(percentile_midpoint(&samples, 25.0).unwrap(), 1.5));
        // index 2.25 -> (3 + 4) / 2
        assert!(approx(percentile_midpoint(&samples, 75.0).unwrap(), 3.5));
        assert!(approx(percentile_midpoint(&samples, 0.0).unwrap(), 1.0));
        assert!(approx(percentile_midpoint(&samples, 100.0).unwrap(), 4.0));
    }

    #[test]
    fn test_percentile_out_of_range() {
        assert!(percentile_midpoint(&[1.0], 101.0).is_err());
        assert!(percentile_midpoint(&[1.0], -1.0).is_err());
    }

    #[test]
    fn test_iqr() {
        assert!(approx(iqr(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.0));
        assert!(approx(iqr(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(), 2.0));
    }

    #[test]
    fn test_iqr_single_sample_is_zero() {
        assert!(approx(iqr(&[5.0]).unwrap(), 0.0));
    }

    #[test]
    fn test_max_min() {
        let samples = [3.5, -1.0, 7.25];
        assert!(approx(max(&samples).unwrap(), 7.25));
        assert!(approx(min(&samples).unwrap(), -1.0));
    }

    #[test]
    fn test_nan_poisons_every_statistic() {
        let samples = [1.0, f64::NAN, 3.0];
        for result in [
            sum(&samples),
            mean(&samples),
            median(&samples),
            percentile_midpoint(&samples, 25.0),
            iqr(&samples),
            max(&samples),
            min(&samples),
        ] {
            assert!(result.unwrap().is_nan());
        }

        let summary = TrialSummary::from_samples(&samples).unwrap();
        assert!(summary.median.is_nan() && summary.max.is_nan() && summary.min.is_nan());
    }

    #[test]
    fn test_infinite_samples_are_ordered() {
        let samples = [f64::NEG_INFINITY, 0.0, f64::INFINITY];
        assert_eq!(max(&samples).unwrap(), f64::INFINITY);
        assert_eq!(min(&samples).unwrap(), f64::NEG_INFINITY);
        assert!(approx(median(&samples).unwrap(), 0.0));
    }

    #[test]
    fn test_round2() {
        assert!(approx(round2(1.234_5), 1.23));
        assert!(approx(round2(1.236), 1.24));
        assert!(approx(round2(-2.0), -2.0));
    }

    #[test]
    fn test_trial_summary_preview_truncated() {
        let samples: Vec<f64> = (0..15).map(f64::from).collect();
        let summary = TrialSummary::from_samples(&samples).unwrap();
        assert_eq!(summary.preview.len(), PREVIEW_LEN);
        assert!(approx(summary.mean, 7.0));
        assert!(approx(summary.max, 14.0));
        assert!(approx(summary.min, 0.0));
    }

    #[test]
    fn test_trial_summary_short_trial() {
        let summary = TrialSummary::from_samples(&[80.0]).unwrap();
        assert_eq!(summary.preview, vec![80.0]);
        assert!(approx(summary.mean, 80.0));
        assert!(approx(summary.iqr, 0.0));
    }
}
