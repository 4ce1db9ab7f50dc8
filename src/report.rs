//! Summary reporting
//!
//! [`summarize`] turns a store into one row per (metric, trial) pair;
//! [`SummaryReport`] renders those rows as a box-drawn table. The report sink
//! functions either stream the table to a writer or save it next to a raw JSON
//! dump of the store's metrics.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::stats::{TrialSummary, PREVIEW_LEN};
use crate::store::MetricStore;
use crate::view::resolve_trial_labels;
use crate::Result;

const BANNER: &str = " -------------------- Metric Summary --------------------";

/// One (metric, trial) row of a summary report.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// Metric name
    pub metric: String,
    /// Raw trial identifier (`"trial-{n}"`)
    pub trial: String,
    /// Resolved display label for the trial
    pub label: String,
    /// Statistics over the trial's samples
    pub summary: TrialSummary,
}

impl SummaryRow {
    /// Sample preview cell, e.g. `[80.0, 79.5]`.
    #[must_use]
    pub fn preview_cell(&self) -> String {
        let values: Vec<String> = self.summary.preview.iter().map(|v| format_number(*v)).collect();
        format!("[{}]", values.join(", "))
    }

    /// Statistics cell, e.g. `Avg:80.0, Median: 80.0, IQR: 0.0, Max: 80.0, Min: 80.0`.
    #[must_use]
    pub fn statistics_cell(&self) -> String {
        let s = &self.summary;
        format!(
            "Avg:{}, Median: {}, IQR: {}, Max: {}, Min: {}",
            format_number(s.mean),
            format_number(s.median),
            format_number(s.iqr),
            format_number(s.max),
            format_number(s.min),
        )
    }
}

/// Tabular summary of every metric and trial in a store.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    trial_tag: String,
    rows: Vec<SummaryRow>,
}

impl SummaryReport {
    /// Report rows in metric order, then trial order.
    #[must_use]
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Rows belonging to one metric.
    pub fn rows_for<'a>(&'a self, metric: &'a str) -> impl Iterator<Item = &'a SummaryRow> + 'a {
        self.rows.iter().filter(move |row| row.metric == metric)
    }

    /// Column headers; the second column is named after the store's trial tag.
    #[must_use]
    pub fn headers(&self) -> [String; 4] {
        [
            "Metric".to_string(),
            self.trial_tag.clone(),
            format!("Values (First {PREVIEW_LEN} values)"),
            "Summary".to_string(),
        ]
    }

    /// Render the report as a box-drawn grid between two banner lines.
    #[must_use]
    pub fn to_table(&self) -> String {
        let headers = self.headers();
        let cells: Vec<[String; 4]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.metric.clone(),
                    row.label.clone(),
                    row.preview_cell(),
                    row.statistics_cell(),
                ]
            })
            .collect();

        let mut widths = headers.clone().map(|h| h.chars().count());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(BANNER);
        out.push('\n');
        out.push_str(&rule(&widths, ('╒', '═', '╤', '╕')));
        out.push_str(&line(&widths, &headers));
        out.push_str(&rule(&widths, ('╞', '═', '╪', '╡')));
        for (i, row) in cells.iter().enumerate() {
            out.push_str(&line(&widths, row));
            if i + 1 < cells.len() {
                out.push_str(&rule(&widths, ('├', '─', '┼', '┤')));
            }
        }
        out.push_str(&rule(&widths, ('╘', '═', '╧', '╛')));
        out.push_str(BANNER);
        out.push('\n');
        out
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_table())
    }
}

fn rule(widths: &[usize; 4], (left, fill, cross, right): (char, char, char, char)) -> String {
    let segments: Vec<String> = widths
        .iter()
        .map(|w| std::iter::repeat(fill).take(w + 2).collect())
        .collect();
    format!("{left}{}{right}\n", segments.join(&cross.to_string()))
}

fn line(widths: &[usize; 4], cells: &[String; 4]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .zip(cells)
        .map(|(w, cell)| {
            let pad = w - cell.chars().count();
            format!(" {cell}{} ", " ".repeat(pad))
        })
        .collect();
    format!("│{}│\n", padded.join("│"))
}

/// Format a number the way the report shows it: integral values keep one
/// decimal place (`80.0`), others print in shortest form (`79.53`).
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Compute the summary report for every (metric, trial) pair of a store.
///
/// Trial labels are resolved per metric against the store's trial label list.
/// A trial with no samples has nothing to summarize; it is logged and left out
/// of the report.
///
/// # Errors
///
/// Currently infallible; the `Result` is kept for summary sources that can
/// fail.
#[allow(clippy::unnecessary_wraps)]
pub fn summarize(store: &MetricStore) -> Result<SummaryReport> {
    let mut rows = Vec::new();
    for (metric, trials) in store.metrics() {
        let labels = resolve_trial_labels(trials, store.trial_tag_list());
        for ((trial, samples), label) in trials.iter().zip(labels) {
            let Ok(summary) = TrialSummary::from_samples(samples) else {
                tracing::warn!(
                    store = store.name(),
                    metric = %metric,
                    trial = %trial,
                    "trial has no samples, skipping summary row"
                );
                continue;
            };
            rows.push(SummaryRow {
                metric: metric.clone(),
                trial: trial.clone(),
                label,
                summary,
            });
        }
    }

    Ok(SummaryReport {
        trial_tag: store.trial_tag().to_string(),
        rows,
    })
}

/// Stream the rendered report to a writer (e.g. stdout).
///
/// # Errors
///
/// Returns error if the writer fails
pub fn write_report<W: Write>(mut out: W, report: &SummaryReport) -> Result<()> {
    out.write_all(report.to_table().as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Save the report to `{prefix}_summary.txt`, followed by a raw JSON dump of
/// the store's metrics.
///
/// # Returns
///
/// Path of the written file.
///
/// # Errors
///
/// Returns error if the metrics cannot be serialized or the file cannot be
/// written
pub fn save_report(
    prefix: impl AsRef<Path>,
    report: &SummaryReport,
    store: &MetricStore,
) -> Result<PathBuf> {
    let mut path = prefix.as_ref().as_os_str().to_owned();
    path.push("_summary.txt");
    let path = PathBuf::from(path);

    let mut contents = report.to_table();
    contents.push('\n');
    contents.push_str(&serde_json::to_string_pretty(store.metrics())?);
    contents.push('\n');

    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), rows = report.rows().len(), "summary report saved");
    Ok(path)
}
