//! CSV reader for the AirDNA monthly performance export.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::analyzers::types::RawPerformanceRecord;
use crate::error::AnalysisError;

/// Columns the pipeline reads; any other vendor columns are ignored.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Property ID",
    "Active",
    "Available Days",
    "Reservation Days",
    "Occupancy Rate",
    "Revenue (USD)",
    "Revenue (Native)",
    "ADR (USD)",
    "ADR (Native)",
    "City",
    "State",
    "Reporting Month",
];

fn check_headers(headers: &StringRecord) -> Result<(), AnalysisError> {
    match REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        Some(missing) => Err(AnalysisError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}

/// Decodes performance rows from CSV data.
///
/// # Errors
///
/// Fails with [`AnalysisError::MissingColumn`] when the header lacks a required
/// column, or with the CSV error for a row that cannot be decoded.
pub fn read_performance_csv<R: Read>(reader: R) -> Result<Vec<RawPerformanceRecord>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    check_headers(&headers)?;

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        // Header is line 1.
        let record: RawPerformanceRecord =
            result.with_context(|| format!("invalid performance row at line {}", i + 2))?;
        rows.push(record);
    }

    Ok(rows)
}

/// Reads the monthly performance export at `path`.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn read_performance_file(path: &Path) -> Result<Vec<RawPerformanceRecord>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let rows = read_performance_csv(file)?;
    info!(rows = rows.len(), "Performance export loaded");
    Ok(rows)
}
