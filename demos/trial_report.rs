//! Trial Report Example
//!
//! Records three metrics over five trials of ten repeats each, snapshots every
//! trial boundary, then prints the summary table and chart data tables.
//!
//! Run with: cargo run --example trial_report
//! Verbose:  RUST_LOG=trial_metrics=debug cargo run --example trial_report

use anyhow::Result;
use rand::Rng;
use tracing_subscriber::EnvFilter;
use trial_metrics::export::write_parquet;
use trial_metrics::render::{render_with_retry, ChartFrame, ChartKind, Grouping, TableRenderer};
use trial_metrics::report::{save_report, summarize, write_report};
use trial_metrics::snapshot::{FsBackend, SnapshotGateway};
use trial_metrics::store::MetricStore;

const TRIALS: usize = 5;
const REPEATS: usize = 10;
const METRICS: usize = 3;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== trial-metrics: Trial Report ===\n");

    let out_dir = tempfile::tempdir()?;
    let gateway = SnapshotGateway::new(FsBackend::new(out_dir.path()));

    // -------------------------------------------------------------------------
    // 1. Record repeated trials
    // -------------------------------------------------------------------------
    println!("1. Recording {TRIALS} trials x {REPEATS} repeats...");

    let mut store = MetricStore::builder()
        .name("example")
        .trial_tag("Model")
        .trial_tag_list(["LSTM", "GRU", "CNN", "BERT", "RoBERTa"])
        .build();

    let mut rng = rand::thread_rng();
    for _ in 0..TRIALS {
        for _ in 0..REPEATS {
            for n in 0..METRICS {
                // n is the metric scale factor
                #[allow(clippy::cast_precision_loss)]
                let value = rng.gen::<f64>() + n as f64;
                store.add_metric(format!("Metric-{}", n + 1), (value * 100.0).round() / 100.0);
            }
        }
        let key = store.next_trial(&gateway)?;
        println!("   snapshot: {key}");
    }

    // -------------------------------------------------------------------------
    // 2. Summary table
    // -------------------------------------------------------------------------
    println!("\n2. Summary...");
    let report = summarize(&store)?;
    write_report(std::io::stdout().lock(), &report)?;
    let summary_path = save_report(out_dir.path().join("example"), &report, &store)?;
    println!("   saved: {}", summary_path.display());

    // -------------------------------------------------------------------------
    // 3. Chart data for every kind, both groupings
    // -------------------------------------------------------------------------
    println!("\n3. Chart frames...");
    let mut renderer = TableRenderer::new(Vec::new());
    for grouping in [Grouping::ByTrial, Grouping::ByMetric] {
        for kind in ChartKind::ALL {
            let frame = ChartFrame::build(&store, kind, grouping)?;
            render_with_retry(&mut renderer, &frame, 3)?;
            println!("   {:<36} {} series", frame.artifact_stem(), frame.series.len());
        }
    }
    let tables = String::from_utf8(renderer.into_inner())?;
    println!("   {} data lines rendered", tables.lines().count());

    // -------------------------------------------------------------------------
    // 4. Columnar export and reload
    // -------------------------------------------------------------------------
    println!("\n4. Exporting to Parquet...");
    let parquet_path = out_dir.path().join("example_metrics.parquet");
    write_parquet(&parquet_path, store.metrics())?;
    println!("   written: {}", parquet_path.display());

    let restored = gateway.load_latest("example-trial_id")?;
    println!(
        "\n5. Reloaded snapshot at trial {} ({} metrics)",
        restored.current_trial_id(),
        restored.metrics().len()
    );

    println!("\n=== Done ===");
    Ok(())
}
