use crate::analyzers::periods::quarter_label;
use crate::analyzers::types::{MetricRow, MetricTable, MetricTables, REGION_COLUMNS};
use crate::analyzers::utility::mean;
use crate::error::AnalysisError;
use tracing::warn;

const MONTHS_PER_QUARTER: usize = 3;

/// Collapses a monthly table into quarterly rows.
///
/// Each quarter's value is the mean of its months' present values, per column.
/// Quarters are emitted in the order they first appear. Rows whose label is
/// not a `YYYY.MM` month are skipped.
pub fn aggregate_by_quarter(monthly: &MetricTable) -> MetricTable {
    let mut groups: Vec<(String, Vec<&MetricRow>)> = Vec::new();

    for row in &monthly.rows {
        let Some(quarter) = quarter_label(&row.label) else {
            warn!(label = %row.label, "Skipping row without a month label");
            continue;
        };
        match groups.iter_mut().find(|(q, _)| *q == quarter) {
            Some((_, members)) => members.push(row),
            None => groups.push((quarter, vec![row])),
        }
    }

    let mut quarterly = MetricTable::default();
    for (quarter, members) in groups {
        if members.len() < MONTHS_PER_QUARTER {
            let error = AnalysisError::IncompleteQuarter {
                quarter: quarter.clone(),
                months: members.len(),
            };
            warn!(%error, "Averaging partial quarter");
        }

        let mut row = MetricRow::empty(quarter);
        for i in 0..REGION_COLUMNS.len() {
            row.values[i] = mean(members.iter().map(|m| m.values[i]));
        }
        quarterly.push(row);
    }

    quarterly
}

/// Applies [`aggregate_by_quarter`] to each metric.
pub fn aggregate_quarterly(monthly: &MetricTables) -> MetricTables {
    MetricTables {
        occupancy: aggregate_by_quarter(&monthly.occupancy),
        adr: aggregate_by_quarter(&monthly.adr),
        revpar: aggregate_by_quarter(&monthly.revpar),
    }
}
