use crate::analyzers::periods::{format_period, generate_periods};
use crate::analyzers::quarterly::aggregate_quarterly;
use crate::analyzers::regions::RegionMap;
use crate::analyzers::report::{QuarterSummary, assemble_report};
use crate::analyzers::series::build_monthly_series;
use crate::analyzers::types::{RawPerformanceRecord, ReportTable};
use crate::error::Result;
use tracing::info;

/// Options for a single report run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub regions: RegionMap,
    pub summary: QuarterSummary,
}

/// Runs the whole pipeline for the year-quarter `yq`:
/// periods, monthly series, quarterly rollup and report assembly.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidPeriod`](crate::error::AnalysisError::InvalidPeriod)
/// before any computation when `yq` cannot be parsed.
#[tracing::instrument(skip(records, options), fields(records = records.len()))]
pub fn analyze_performance(
    records: &[RawPerformanceRecord],
    yq: &str,
    options: &AnalysisOptions,
) -> Result<ReportTable> {
    let periods = generate_periods(yq)?;
    info!(
        first = ?periods.first().map(|p| format_period(*p)),
        last = ?periods.last().map(|p| format_period(*p)),
        count = periods.len(),
        "Analysis window"
    );

    let monthly = build_monthly_series(records, &periods, &options.regions);
    let quarterly = aggregate_quarterly(&monthly);
    let report = assemble_report(&quarterly, &monthly, options.summary);

    info!(rows = report.rows.len(), "Report assembled");
    Ok(report)
}
