use crate::analyzers::monthly::monthly_performance;
use crate::analyzers::regions::RegionMap;
use crate::analyzers::types::{MetricTables, RawPerformanceRecord};
use chrono::NaiveDate;
use tracing::info;

/// Runs the monthly calculation for every period and stacks the rows, in
/// period order, into one table per metric.
pub fn build_monthly_series(
    records: &[RawPerformanceRecord],
    periods: &[NaiveDate],
    regions: &RegionMap,
) -> MetricTables {
    let mut tables = MetricTables::default();

    for (i, &period) in periods.iter().enumerate() {
        info!(
            period = %period,
            progress = %format!("{}/{}", i + 1, periods.len()),
            "Running monthly analysis"
        );
        let snapshot = monthly_performance(records, period, regions);
        tables.occupancy.push(snapshot.occupancy);
        tables.adr.push(snapshot.adr);
        tables.revpar.push(snapshot.revpar);
    }

    tables
}
