//! Per-month regional occupancy, ADR and RevPAR.

use crate::analyzers::periods::month_label;
use crate::analyzers::regions::RegionMap;
use crate::analyzers::types::{MetricRow, MonthlySnapshot, RawPerformanceRecord, REGION_COLUMNS};
use crate::analyzers::utility::{mean, quantile};
use crate::error::AnalysisError;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Quantile bounds of native ADR; rows must fall strictly inside.
const ADR_LOWER_QUANTILE: f64 = 0.02;
const ADR_UPPER_QUANTILE: f64 = 0.98;

/// Derived metrics for one qualifying property.
#[derive(Debug, Clone, PartialEq)]
struct PropertyMetrics<'a> {
    city: &'a str,
    occ: Option<f64>,
    adr_usd: Option<f64>,
    adr_native: f64,
}

impl<'a> PropertyMetrics<'a> {
    fn from_record(record: &'a RawPerformanceRecord) -> Option<Self> {
        let city = record.city.as_deref().map(str::trim).filter(|c| !c.is_empty())?;

        // Undefined native ADR counts as zero.
        let adr_native = per_reserved_day(record.revenue_native, record.reservation_days)
            .unwrap_or(0.0);

        Some(Self {
            city,
            occ: record.occupancy_rate,
            adr_usd: per_reserved_day(record.revenue_usd, record.reservation_days),
            adr_native,
        })
    }

    fn revpar(&self) -> Option<f64> {
        self.occ.map(|occ| occ * self.adr_native)
    }
}

fn per_reserved_day(revenue: Option<f64>, days: Option<f64>) -> Option<f64> {
    let value = revenue? / days?;
    (!value.is_nan()).then_some(value)
}

fn qualifies(record: &RawPerformanceRecord, month: NaiveDate) -> bool {
    record.active
        && record.available_days.is_some_and(|d| d > 0.0)
        && record.reporting_month == month
}

/// Drops rows whose native ADR is not strictly between the 2nd and 98th percentile.
fn trim_adr_outliers(rows: Vec<PropertyMetrics<'_>>) -> Vec<PropertyMetrics<'_>> {
    let adrs: Vec<f64> = rows.iter().map(|r| r.adr_native).collect();
    let (Some(lower), Some(upper)) = (
        quantile(&adrs, ADR_LOWER_QUANTILE),
        quantile(&adrs, ADR_UPPER_QUANTILE),
    ) else {
        return Vec::new();
    };

    debug!(lower, upper, "ADR trim bounds");
    rows.into_iter()
        .filter(|r| r.adr_native > lower && r.adr_native < upper)
        .collect()
}

/// Cities whose rows reach no regional column: missing from `regions`, or
/// mapped to a label that is not a report column.
fn unreported_cities<'a>(rows: &[PropertyMetrics<'a>], regions: &RegionMap) -> BTreeSet<&'a str> {
    rows.iter()
        .map(|r| r.city)
        .filter(|c| {
            !regions
                .region_of(c)
                .is_some_and(|region| REGION_COLUMNS[1..].contains(&region))
        })
        .collect()
}

/// Computes one month's occupancy, ADR and RevPAR for the nation and each region.
///
/// Rows are restricted to active properties with available days in `month`,
/// native ADR outliers are trimmed, and the survivors are averaged per region.
/// Cities missing from `regions` still count toward the national figure.
/// A month with no surviving rows yields all-missing rows.
#[tracing::instrument(level = "debug", skip(records, regions), fields(month = %month))]
pub fn monthly_performance(
    records: &[RawPerformanceRecord],
    month: NaiveDate,
    regions: &RegionMap,
) -> MonthlySnapshot {
    let label = month_label(month);

    let candidates: Vec<PropertyMetrics<'_>> = records
        .iter()
        .filter(|r| qualifies(r, month))
        .filter_map(PropertyMetrics::from_record)
        .collect();
    let candidate_count = candidates.len();

    let rows = trim_adr_outliers(candidates);
    debug!(candidates = candidate_count, kept = rows.len(), "Rows after outlier trim");

    if rows.is_empty() {
        let error = AnalysisError::MissingMonthData {
            month: label.clone(),
        };
        warn!(%error, "Month has no usable rows");
        return MonthlySnapshot {
            occupancy: MetricRow::empty(&label),
            adr: MetricRow::empty(&label),
            revpar: MetricRow::empty(&label),
        };
    }

    for city in &unreported_cities(&rows, regions) {
        let error = AnalysisError::UnmappedRegion {
            city: city.to_string(),
        };
        warn!(%error, month = %label, "City counted nationally only");
    }

    let mut by_region: HashMap<&str, Vec<&PropertyMetrics<'_>>> = HashMap::new();
    for row in &rows {
        by_region.entry(regions.resolve(row.city)).or_default().push(row);
    }

    debug!(
        adr_usd = ?mean(rows.iter().map(|r| r.adr_usd)),
        "National USD ADR"
    );

    let mut occupancy = MetricRow::empty(&label);
    let mut adr = MetricRow::empty(&label);
    let mut revpar = MetricRow::empty(&label);

    for (i, column) in REGION_COLUMNS.iter().enumerate() {
        let members: Vec<&PropertyMetrics<'_>> = if i == 0 {
            rows.iter().collect()
        } else {
            by_region.get(column).cloned().unwrap_or_default()
        };
        if members.is_empty() {
            continue;
        }

        occupancy.values[i] = mean(members.iter().map(|r| r.occ));
        adr.values[i] = mean(members.iter().map(|r| Some(r.adr_native)));
        revpar.values[i] = mean(members.iter().map(|r| r.revpar()));
    }

    MonthlySnapshot {
        occupancy,
        adr,
        revpar,
    }
}
