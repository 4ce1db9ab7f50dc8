//! Columnar export (Arrow/Parquet)
//!
//! The nested metric map is flattened into a long-format table, one row per
//! sample:
//!
//! | metric | trial | `sample_index` | value |
//! |--------|-------|----------------|-------|
//! | Utf8   | Utf8  | UInt32         | Float64 |
//!
//! Rows follow store order (metric, then trial, then sample), so reading the
//! table back rebuilds the map with the same first-seen ordering.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, Float64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

use crate::store::MetricMap;
use crate::{Error, Result};

/// Schema of the long-format sample table.
#[must_use]
pub fn sample_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("metric", DataType::Utf8, false),
        Field::new("trial", DataType::Utf8, false),
        Field::new("sample_index", DataType::UInt32, false),
        Field::new("value", DataType::Float64, false),
    ]))
}

/// Flatten a metric map into a long-format `RecordBatch`.
///
/// # Errors
///
/// Returns error if a trial holds more than `u32::MAX` samples or the batch
/// cannot be assembled
pub fn to_record_batch(metrics: &MetricMap) -> Result<RecordBatch> {
    let mut metric_col = Vec::new();
    let mut trial_col = Vec::new();
    let mut index_col = Vec::new();
    let mut value_col = Vec::new();

    for (metric, trials) in metrics {
        for (trial, samples) in trials {
            for (index, value) in samples.iter().enumerate() {
                let index = u32::try_from(index).map_err(|_| {
                    Error::StorageError(format!("{metric}/{trial}: too many samples for export"))
                })?;
                metric_col.push(metric.as_str());
                trial_col.push(trial.as_str());
                index_col.push(index);
                value_col.push(*value);
            }
        }
    }

    Ok(RecordBatch::try_new(
        sample_schema(),
        vec![
            Arc::new(StringArray::from(metric_col)),
            Arc::new(StringArray::from(trial_col)),
            Arc::new(UInt32Array::from(index_col)),
            Arc::new(Float64Array::from(value_col)),
        ],
    )?)
}

/// Rebuild a metric map from long-format batches.
///
/// Rows are appended in table order; `sample_index` is informational only.
///
/// # Errors
///
/// Returns [`Error::StorageError`] if a batch does not have the sample schema
pub fn from_record_batches(batches: &[RecordBatch]) -> Result<MetricMap> {
    let mut metrics = MetricMap::new();
    for batch in batches {
        let metric = string_column(batch, "metric")?;
        let trial = string_column(batch, "trial")?;
        let value = batch
            .column_by_name("value")
            .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
            .ok_or_else(|| Error::StorageError("missing Float64 column 'value'".to_string()))?;

        for row in 0..batch.num_rows() {
            if metric.is_null(row) || trial.is_null(row) || value.is_null(row) {
                return Err(Error::StorageError(format!("null cell in sample row {row}")));
            }
            metrics
                .entry(metric.value(row).to_string())
                .or_default()
                .entry(trial.value(row).to_string())
                .or_default()
                .push(value.value(row));
        }
    }
    Ok(metrics)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::StorageError(format!("missing Utf8 column '{name}'")))
}

/// Write the long-format table to a Parquet file.
///
/// # Errors
///
/// Returns error if the file cannot be created or written
pub fn write_parquet<P: AsRef<Path>>(path: P, metrics: &MetricMap) -> Result<()> {
    let batch = to_record_batch(metrics)?;
    let file = File::create(path.as_ref())?;

    let mut writer = ArrowWriter::try_new(file, sample_schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;

    tracing::info!(path = %path.as_ref().display(), rows = batch.num_rows(), "parquet export written");
    Ok(())
}

/// Read a Parquet file written by [`write_parquet`] back into a metric map.
///
/// # Errors
///
/// Returns error if the file cannot be read or does not have the sample schema
pub fn read_parquet<P: AsRef<Path>>(path: P) -> Result<MetricMap> {
    let file = File::open(path.as_ref())
        .map_err(|e| Error::StorageError(format!("Failed to open Parquet file: {e}")))?;

    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::StorageError(format!("Failed to parse Parquet file: {e}")))?
        .build()
        .map_err(|e| Error::StorageError(format!("Failed to create Parquet reader: {e}")))?;

    let mut batches = Vec::new();
    for batch in reader {
        let batch =
            batch.map_err(|e| Error::StorageError(format!("Failed to read record batch: {e}")))?;
        batches.push(batch);
    }

    from_record_batches(&batches)
}
