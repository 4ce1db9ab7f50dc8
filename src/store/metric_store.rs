//! Metric Store - append-only trial-indexed samples

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{trial_key, MetricMap};
use crate::snapshot::{SnapshotBackend, SnapshotGateway};
use crate::Result;

/// Default experiment name when none is given.
pub const DEFAULT_NAME: &str = "unnamed";

/// Default display label for a trial.
pub const DEFAULT_TRIAL_TAG: &str = "Trial";

/// Append-only collection of metric samples, grouped by trial.
///
/// Samples are always appended to the current trial. The trial counter only
/// moves forward, so within a metric trial ids appear in increasing order.
///
/// ## Lifecycle
///
/// 1. Create with [`MetricStore::new`] or [`MetricStore::builder`]
///    (optionally pre-seeded with an existing metric map)
/// 2. Record samples with [`MetricStore::add_metric`]
/// 3. Close each trial with [`MetricStore::next_trial`], which snapshots
///    the store through a [`SnapshotGateway`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricStore {
    name: String,
    trial_tag: String,
    trial_tag_list: Vec<String>,
    current_trial_id: u64,
    #[serde(with = "super::sample_format")]
    metrics: MetricMap,
    version: String,
    created_at: DateTime<Utc>,
}

impl MetricStore {
    /// Create an empty store for the named experiment run.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        MetricStoreBuilder::new().name(name).build()
    }

    /// Create a builder for a store with optional fields.
    #[must_use]
    pub fn builder() -> MetricStoreBuilder {
        MetricStoreBuilder::new()
    }

    /// Get the experiment run name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the display label for a trial (e.g. "Trial", "Epoch").
    #[must_use]
    pub fn trial_tag(&self) -> &str {
        &self.trial_tag
    }

    /// Get the human-readable trial labels, if any were configured.
    #[must_use]
    pub fn trial_tag_list(&self) -> &[String] {
        &self.trial_tag_list
    }

    /// Get the id of the trial that `add_metric` currently appends to.
    #[must_use]
    pub const fn current_trial_id(&self) -> u64 {
        self.current_trial_id
    }

    /// Get the full metric -> trial -> samples mapping.
    #[must_use]
    pub const fn metrics(&self) -> &MetricMap {
        &self.metrics
    }

    /// Get the crate version that created this store.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Check if no samples have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Metric names in first-seen order.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    /// Number of trials recorded for a metric (0 if the metric is unknown).
    #[must_use]
    pub fn trial_count(&self, metric: &str) -> usize {
        self.metrics.get(metric).map_or(0, indexmap::IndexMap::len)
    }

    /// Samples recorded for a metric in a given trial (`"trial-{n}"`).
    #[must_use]
    pub fn samples(&self, metric: &str, trial: &str) -> Option<&[f64]> {
        self.metrics
            .get(metric)
            .and_then(|trials| trials.get(trial))
            .map(Vec::as_slice)
    }

    /// Append a sample to `metric` in the current trial.
    ///
    /// Creates the metric and/or the trial entry on first use.
    pub fn add_metric(&mut self, metric: impl Into<String>, value: f64) {
        let metric = metric.into();
        let trial = trial_key(self.current_trial_id);

        let trials = self.metrics.entry(metric).or_default();
        if !trials.contains_key(&trial) {
            tracing::debug!(trial = %trial, "opening trial entry");
        }
        trials.entry(trial).or_default().push(value);
    }

    /// Move to the next trial without taking a snapshot.
    ///
    /// Returns the new trial id.
    pub fn advance_trial(&mut self) -> u64 {
        self.current_trial_id += 1;
        self.current_trial_id
    }

    /// Close the current trial: advance the trial counter, then snapshot.
    ///
    /// Must be called between trials, never mid-trial, since it changes which
    /// trial subsequent [`add_metric`](Self::add_metric) calls target.
    ///
    /// # Returns
    ///
    /// The key the snapshot was stored under.
    ///
    /// # Errors
    ///
    /// Returns error if the snapshot cannot be encoded or written. The trial
    /// counter has already advanced at that point.
    pub fn next_trial<B: SnapshotBackend>(
        &mut self,
        gateway: &SnapshotGateway<B>,
    ) -> Result<String> {
        self.advance_trial();
        gateway.snapshot(self)
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        MetricStoreBuilder::new().build()
    }
}

/// Builder for `MetricStore`.
#[derive(Debug, Default)]
pub struct MetricStoreBuilder {
    name: Option<String>,
    trial_tag: Option<String>,
    trial_tag_list: Vec<String>,
    metrics: MetricMap,
}

impl MetricStoreBuilder {
    /// Create a new builder with default fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the experiment run name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the display label for a trial. An empty tag keeps the default.
    #[must_use]
    pub fn trial_tag(mut self, trial_tag: impl Into<String>) -> Self {
        self.trial_tag = Some(trial_tag.into());
        self
    }

    /// Set human-readable labels for the trials, in trial order.
    #[must_use]
    pub fn trial_tag_list<I, T>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.trial_tag_list = labels.into_iter().map(|t| t.to_string()).collect();
        self
    }

    /// Pre-seed the store with an existing metric map.
    #[must_use]
    pub fn metrics(mut self, metrics: MetricMap) -> Self {
        self.metrics = metrics;
        self
    }

    /// Build the `MetricStore`.
    #[must_use]
    pub fn build(self) -> MetricStore {
        let trial_tag = self
            .trial_tag
            .filter(|tag| !tag.is_empty())
            .unwrap_or_else(|| DEFAULT_TRIAL_TAG.to_string());

        MetricStore {
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            trial_tag,
            trial_tag_list: self.trial_tag_list,
            current_trial_id: 0,
            metrics: self.metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
        }
    }
}
