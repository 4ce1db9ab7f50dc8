//! # trial-metrics: Repeated-Trial Metric Aggregation
//!
//! trial-metrics collects named metric samples across repeated trials of an
//! experiment and derives everything needed to report on them: per-trial
//! descriptive statistics, a summary table, chart frames for trajectory, box,
//! violin and bar charts, and snapshots at every trial boundary.
//!
//! ## Design Principles
//!
//! - **Append-only store**: samples are only ever appended to the current trial
//! - **Ordered views**: metric and trial order is first-seen order everywhere
//! - **Read-only projections**: transposes, reductions and reports never write
//!   back into the store
//! - **Typed failures**: reductions over zero samples are errors, never `NaN`
//!
//! ## Example Usage
//!
//! ```rust
//! use trial_metrics::report::summarize;
//! use trial_metrics::snapshot::{MemoryBackend, SnapshotGateway};
//! use trial_metrics::store::MetricStore;
//!
//! # fn main() -> trial_metrics::Result<()> {
//! let gateway = SnapshotGateway::new(MemoryBackend::new());
//! let mut store = MetricStore::new("bert-finetune");
//!
//! for trial in 0..3 {
//!     for repeat in 0..5 {
//!         store.add_metric("Accuracy", 80.0 + f64::from(trial) + f64::from(repeat) * 0.1);
//!     }
//!     store.next_trial(&gateway)?;
//! }
//!
//! let report = summarize(&store)?;
//! assert_eq!(report.rows().len(), 3);
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;
pub mod export;
pub mod render;
pub mod report;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod view;

pub use error::{Error, Result};
pub use store::{MetricMap, MetricStore, MetricStoreBuilder, TrialMap};
