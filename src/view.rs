//! Derived views over a metric map
//!
//! Views are read-only projections: every function here borrows its input and
//! returns a freshly built value. Nothing is written back into the store.

use indexmap::IndexMap;

use crate::store::MetricMap;
use crate::{stats, Result};

/// Reduction applied to each trial's samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Arithmetic mean
    Mean,
    /// Sum
    Sum,
}

impl Reduction {
    /// Get reduction name as string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
        }
    }

    /// Apply the reduction to one sample sequence.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if `samples` is empty
    pub fn apply(&self, samples: &[f64]) -> Result<f64> {
        match self {
            Self::Mean => stats::mean(samples),
            Self::Sum => stats::sum(samples),
        }
    }
}

/// Swap the two outer levels of a nested map.
///
/// `metric -> trial -> samples` becomes `trial -> metric -> samples`. Sample
/// sequences are copied unchanged, and keys at each level appear in the order
/// they are first seen while walking the input.
#[must_use]
pub fn transpose(metrics: &MetricMap) -> MetricMap {
    let mut transposed = MetricMap::new();
    for (outer, inner) in metrics {
        for (key, samples) in inner {
            transposed
                .entry(key.clone())
                .or_default()
                .insert(outer.clone(), samples.clone());
        }
    }
    transposed
}

/// Resolve the display labels for a metric's trials.
///
/// Returns `labels` when it has exactly one entry per trial, otherwise the
/// trial identifiers themselves in insertion order. A non-empty label list of
/// the wrong length is logged and ignored.
#[must_use]
pub fn resolve_trial_labels<V>(trials: &IndexMap<String, V>, labels: &[String]) -> Vec<String> {
    if !labels.is_empty() && labels.len() == trials.len() {
        return labels.to_vec();
    }

    if !labels.is_empty() {
        tracing::warn!(
            labels = ?labels,
            trials = ?trials.keys().collect::<Vec<_>>(),
            "trial label count does not match trial count, using trial ids"
        );
    }
    trials.keys().cloned().collect()
}

/// Reduce every trial's samples to one scalar, per outer key.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidInput`] if any trial has no samples
pub fn reduce_by_trial(
    metrics: &MetricMap,
    reduction: Reduction,
) -> Result<IndexMap<String, Vec<f64>>> {
    metrics
        .iter()
        .map(|(name, trials)| {
            let reduced = trials
                .iter()
                .map(|(trial, samples)| {
                    reduction.apply(samples).map_err(|_| {
                        crate::Error::InvalidInput(format!(
                            "cannot take {} of {name}/{trial}: no samples",
                            reduction.as_str()
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            Ok((name.clone(), reduced))
        })
        .collect()
}

/// Mean of every trial's samples, per metric, in trial order.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidInput`] if any trial has no samples
pub fn average_by_trial(metrics: &MetricMap) -> Result<IndexMap<String, Vec<f64>>> {
    reduce_by_trial(metrics, Reduction::Mean)
}

/// Sum of every trial's samples, per metric, in trial order.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidInput`] if any trial has no samples
pub fn sum_by_trial(metrics: &MetricMap) -> Result<IndexMap<String, Vec<f64>>> {
    reduce_by_trial(metrics, Reduction::Sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::store::TrialMap;
    use crate::Error;

    fn sample_map() -> MetricMap {
        let mut accuracy = TrialMap::new();
        accuracy.insert("trial-0".into(), vec![1.0, 2.0, 3.0]);
        accuracy.insert("trial-1".into(), vec![4.0]);

        let mut loss = TrialMap::new();
        loss.insert("trial-1".into(), vec![0.5, 0.25]);

        let mut metrics = MetricMap::new();
        metrics.insert("Accuracy".into(), accuracy);
        metrics.insert("Loss".into(), loss);
        metrics
    }

    #[test]
    fn test_transpose_first_seen_order() {
        let transposed = transpose(&sample_map());

        let trials: Vec<&String> = transposed.keys().collect();
        assert_eq!(trials, ["trial-0", "trial-1"]);

        let trial1: Vec<&String> = transposed["trial-1"].keys().collect();
        assert_eq!(trial1, ["Accuracy", "Loss"]);
        assert_eq!(transposed["trial-1"]["Loss"], vec![0.5, 0.25]);
        assert!(!transposed["trial-0"].contains_key("Loss"));
    }

    #[test]
    fn test_transpose_keeps_unsorted_order() {
        let mut metrics = MetricMap::new();
        for (metric, trials) in [
            ("zeta", ["trial-2", "trial-0"]),
            ("alpha", ["trial-0", "trial-5"]),
        ] {
            let entry: &mut TrialMap = metrics.entry(metric.to_string()).or_default();
            for trial in trials {
                entry.insert(trial.to_string(), vec![1.0]);
            }
        }

        let transposed = transpose(&metrics);
        let trials: Vec<&String> = transposed.keys().collect();
        assert_eq!(trials, ["trial-2", "trial-0", "trial-5"]);
        let trial0: Vec<&String> = transposed["trial-0"].keys().collect();
        assert_eq!(trial0, ["zeta", "alpha"]);
    }

    #[test]
    fn test_transpose_twice_restores_content() {
        let metrics = sample_map();
        assert_eq!(transpose(&transpose(&metrics)), metrics);
    }

    #[test]
    fn test_transpose_empty() {
        assert!(transpose(&MetricMap::new()).is_empty());
    }

    #[test]
    fn test_resolve_labels_matching_length() {
        let metrics = sample_map();
        let labels = vec!["baseline".to_string(), "tuned".to_string()];
        assert_eq!(resolve_trial_labels(&metrics["Accuracy"], &labels), labels);
    }

    #[test]
    fn test_resolve_labels_mismatch_is_per_metric() {
        let metrics = sample_map();
        let labels = vec!["baseline".to_string(), "tuned".to_string()];
        // Loss has one trial, so the two labels do not apply to it
        assert_eq!(resolve_trial_labels(&metrics["Loss"], &labels), ["trial-1"]);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let value = tracing::subscriber::with_default(subscriber, f);
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        (value, output)
    }

    #[test]
    fn test_resolve_labels_mismatch_is_logged() {
        let metrics = sample_map();
        let labels = vec!["baseline".to_string(), "tuned".to_string()];

        let (resolved, logs) = with_captured_logs(|| resolve_trial_labels(&metrics["Loss"], &labels));
        assert_eq!(resolved, ["trial-1"]);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("trial label count does not match trial count"));

        let (_, logs) = with_captured_logs(|| resolve_trial_labels(&metrics["Accuracy"], &labels));
        assert!(logs.is_empty());

        let (_, logs) = with_captured_logs(|| resolve_trial_labels(&metrics["Loss"], &[]));
        assert!(logs.is_empty());
    }

    #[test]
    fn test_resolve_labels_empty_list() {
        let metrics = sample_map();
        assert_eq!(
            resolve_trial_labels(&metrics["Accuracy"], &[]),
            ["trial-0", "trial-1"]
        );
    }

    #[test]
    fn test_average_and_sum_by_trial() {
        let metrics = sample_map();

        let avg = average_by_trial(&metrics).unwrap();
        assert_eq!(avg["Accuracy"], vec![2.0, 4.0]);
        assert_eq!(avg["Loss"], vec![0.375]);

        let sums = sum_by_trial(&metrics).unwrap();
        assert_eq!(sums["Accuracy"], vec![6.0, 4.0]);
        assert_eq!(sums["Loss"], vec![0.75]);
    }

    #[test]
    fn test_reduce_empty_trial_is_error() {
        let mut metrics = sample_map();
        metrics["Loss"].insert("trial-2".into(), Vec::new());

        let err = average_by_trial(&metrics).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("Loss/trial-2")));
        assert!(sum_by_trial(&metrics).is_err());
    }
}
