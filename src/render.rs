//! Chart frames and the renderer seam
//!
//! Drawing is left to an external [`Renderer`]. This module prepares what a
//! renderer needs: for each series, the resolved x-axis labels and either the
//! raw sample groups (trajectory, box, violin) or one reduced value per
//! position (average/sum bars).
//!
//! ## Groupings
//!
//! | Grouping             | series     | x axis   | source               |
//! |----------------------|------------|----------|----------------------|
//! | [`Grouping::ByTrial`]  | per metric | trials   | `metrics`            |
//! | [`Grouping::ByMetric`] | per trial  | metrics  | `transpose(metrics)` |
//!
//! Retries are an explicit argument to [`render_with_retry`]; there is no
//! shared retry state.

use std::borrow::Cow;
use std::io::Write;

use crate::store::{MetricMap, MetricStore};
use crate::view::{reduce_by_trial, resolve_trial_labels, transpose, Reduction};
use crate::{Error, Result};

/// Kind of chart to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// One line per series through every sample
    Trajectory,
    /// Box plot per x position
    Box,
    /// Violin plot per x position
    Violin,
    /// Bar of the mean per x position
    AverageBar,
    /// Bar of the sum per x position
    SumBar,
}

impl ChartKind {
    /// All chart kinds.
    pub const ALL: [Self; 5] = [
        Self::Trajectory,
        Self::Box,
        Self::Violin,
        Self::AverageBar,
        Self::SumBar,
    ];

    /// Get chart kind as string (used in artifact names)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trajectory => "traj_plot",
            Self::Box => "box_plot",
            Self::Violin => "violin_plot",
            Self::AverageBar => "avg_bar_plot",
            Self::SumBar => "sum_bar_plot",
        }
    }

    const fn reduction(self) -> Option<Reduction> {
        match self {
            Self::AverageBar => Some(Reduction::Mean),
            Self::SumBar => Some(Reduction::Sum),
            Self::Trajectory | Self::Box | Self::Violin => None,
        }
    }
}

/// Which dimension forms the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// Series per metric, trials along the x axis
    ByTrial,
    /// Series per trial, metrics along the x axis.
    ///
    /// The store's trial label list is not applied here: x positions are
    /// metric names and series are named by raw trial id.
    ByMetric,
}

/// Values of one series, aligned with its labels.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    /// Raw samples per x position
    Samples(Vec<Vec<f64>>),
    /// One reduced value per x position
    Scalars(Vec<f64>),
}

impl SeriesData {
    /// Number of x positions.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Samples(groups) => groups.len(),
            Self::Scalars(values) => values.len(),
        }
    }

    /// Check if the series has no x positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One legend entry of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend name (metric name, or trial id when grouped by metric)
    pub name: String,
    /// X-axis labels, one per position
    pub labels: Vec<String>,
    /// Values per position
    pub data: SeriesData,
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    /// Chart kind
    pub kind: ChartKind,
    /// Grouping
    pub grouping: Grouping,
    /// Experiment name
    pub title: String,
    /// X-axis caption
    pub x_label: String,
    /// Series in first-seen order
    pub series: Vec<Series>,
}

impl ChartFrame {
    /// Build a chart frame from a store.
    ///
    /// Trial labels are resolved per series; a label list of the wrong length
    /// is logged and replaced by raw ids. For [`Grouping::ByMetric`] the x axis
    /// shows metric names, so the trial label list does not apply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a bar chart over a trial with no
    /// samples
    pub fn build(store: &MetricStore, kind: ChartKind, grouping: Grouping) -> Result<Self> {
        let (source, labels, x_label): (Cow<'_, MetricMap>, &[String], String) = match grouping {
            Grouping::ByTrial => (
                Cow::Borrowed(store.metrics()),
                store.trial_tag_list(),
                store.trial_tag().to_string(),
            ),
            Grouping::ByMetric => (
                Cow::Owned(transpose(store.metrics())),
                &[],
                "Metric".to_string(),
            ),
        };

        Ok(Self {
            kind,
            grouping,
            title: store.name().to_string(),
            x_label,
            series: build_series(&source, labels, kind)?,
        })
    }

    /// Artifact stem for this chart, e.g. `exp_metric_box_plot`.
    #[must_use]
    pub fn artifact_stem(&self) -> String {
        format!("{}_metric_{}", self.title, self.kind.as_str())
    }
}

fn build_series(source: &MetricMap, labels: &[String], kind: ChartKind) -> Result<Vec<Series>> {
    let reduced = kind
        .reduction()
        .map(|reduction| reduce_by_trial(source, reduction))
        .transpose()?;

    let series = source
        .iter()
        .map(|(name, positions)| {
            let data = match &reduced {
                Some(values) => SeriesData::Scalars(values[name].clone()),
                None => SeriesData::Samples(positions.values().cloned().collect()),
            };
            Series {
                name: name.clone(),
                labels: resolve_trial_labels(positions, labels),
                data,
            }
        })
        .collect();
    Ok(series)
}

/// External chart renderer (plotting library, TeX templating, ...).
pub trait Renderer {
    /// Draw one chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] (or any other error) if drawing fails
    fn render(&mut self, frame: &ChartFrame) -> Result<()>;
}

/// Render a frame, retrying up to `max_attempts` times in total.
///
/// Each failed attempt is logged; the last error is returned if every attempt
/// fails. `max_attempts` of zero is treated as one.
///
/// # Errors
///
/// Returns the renderer's error from the final attempt
pub fn render_with_retry<R: Renderer + ?Sized>(
    renderer: &mut R,
    frame: &ChartFrame,
    max_attempts: u32,
) -> Result<()> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match renderer.render(frame) {
            Ok(()) => return Ok(()),
            Err(e) if attempt < max_attempts => {
                tracing::warn!(
                    chart = %frame.artifact_stem(),
                    attempt,
                    max_attempts,
                    error = %e,
                    "render failed, retrying"
                );
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Renderer that writes frames as tab-separated data tables, the form
/// `pgfplots` reads with `\addplot table`.
///
/// Sample series produce one row per sample (`series`, `label`, `value`);
/// scalar series produce one row per position.
#[derive(Debug)]
pub struct TableRenderer<W> {
    out: W,
}

impl<W: Write> TableRenderer<W> {
    /// Create a renderer writing to `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the renderer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TableRenderer<W> {
    fn render(&mut self, frame: &ChartFrame) -> Result<()> {
        let io = |e: std::io::Error| Error::Render(format!("{}: {e}", frame.artifact_stem()));

        writeln!(self.out, "# {}", frame.artifact_stem()).map_err(io)?;
        writeln!(self.out, "series\t{}\tvalue", frame.x_label).map_err(io)?;
        for series in &frame.series {
            match &series.data {
                SeriesData::Samples(groups) => {
                    for (label, group) in series.labels.iter().zip(groups) {
                        for value in group {
                            writeln!(self.out, "{}\t{label}\t{value}", series.name).map_err(io)?;
                        }
                    }
                }
                SeriesData::Scalars(values) => {
                    for (label, value) in series.labels.iter().zip(values) {
                        writeln!(self.out, "{}\t{label}\t{value}", series.name).map_err(io)?;
                    }
                }
            }
        }
        writeln!(self.out).map_err(io)?;
        Ok(())
    }
}
