// src/output/mod.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::process::Record;

/// Dataset filename for the configured year range.
pub fn dataset_path(start_year: i32, end_year: i32) -> PathBuf {
    PathBuf::from(format!("plane_crashes_{}_{}.csv", start_year, end_year))
}

/// Header = union of all field names across records, in first-seen order.
/// Records carry different key sets depending on what each source page
/// contained.
fn column_union(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for record in records {
        for name in record.field_names() {
            if seen.insert(name.to_string()) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

/// Serialize every accumulated record to a single CSV file: one header
/// row, one data row per record, empty cells for absent or null fields.
pub fn write_dataset(records: &[Record], path: &Path) -> Result<()> {
    let columns = column_union(records);

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer
        .write_record(&columns)
        .context("writing header row")?;
    for record in records {
        writer
            .write_record(columns.iter().map(|name| record.cell(name)))
            .with_context(|| format!("writing row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;

    info!(rows = records.len(), columns = columns.len(), path = %path.display(), "dataset written");
    Ok(())
}
