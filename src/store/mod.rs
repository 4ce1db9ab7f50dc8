//! Metric Store - trial-indexed metric samples
//!
//! The store is a two-level ordered map:
//!
//! ```text
//! metric name ──< trial id ("trial-{n}") ──< samples [f64]
//! ```
//!
//! Both levels iterate in insertion order; reporting, transposition and chart
//! frames all depend on that order.
//!
//! ## Usage
//!
//! ```rust
//! use trial_metrics::store::MetricStore;
//!
//! let mut store = MetricStore::new("resnet-ablation");
//! store.add_metric("Accuracy", 80.0);
//! store.advance_trial();
//! store.add_metric("Accuracy", 90.0);
//!
//! assert_eq!(store.trial_count("Accuracy"), 2);
//! assert_eq!(store.samples("Accuracy", "trial-1"), Some(&[90.0][..]));
//! ```

mod metric_store;
mod sample_format;

pub use metric_store::{MetricStore, MetricStoreBuilder, DEFAULT_NAME, DEFAULT_TRIAL_TAG};

use indexmap::IndexMap;

/// Ordered trial id -> samples mapping for a single metric.
pub type TrialMap = IndexMap<String, Vec<f64>>;

/// Ordered outer -> inner -> samples mapping.
///
/// In the store the outer key is the metric name and the inner key the trial
/// id; [`crate::view::transpose`] produces the same shape with the levels
/// swapped.
pub type MetricMap = IndexMap<String, TrialMap>;

/// Format the trial identifier used as the inner key of [`MetricMap`].
///
/// ```rust
/// assert_eq!(trial_metrics::store::trial_key(3), "trial-3");
/// ```
#[must_use]
pub fn trial_key(trial_id: u64) -> String {
    format!("trial-{trial_id}")
}
