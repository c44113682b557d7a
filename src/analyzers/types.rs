//! Data types used by the performance pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, de};

/// Nationwide column label.
pub const NATIONAL: &str = "전국";

/// Value columns of every metric table, in report order.
pub const REGION_COLUMNS: [&str; 10] = [
    NATIONAL,
    "강원",
    "경기권",
    "경남권",
    "경북권",
    "부산",
    "서울",
    "전라권",
    "제주",
    "충청권",
];

/// Leading label columns of the final report.
pub const METRIC_COLUMN: &str = "Index";
pub const PERIOD_COLUMN: &str = "시점";

/// One property in one reporting month, as exported by AirDNA.
///
/// Numeric cells may be blank in the export, so they are all optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPerformanceRecord {
    #[serde(rename = "Property ID")]
    pub property_id: String,
    #[serde(rename = "Active", deserialize_with = "deserialize_flag")]
    pub active: bool,
    #[serde(rename = "Available Days")]
    pub available_days: Option<f64>,
    #[serde(rename = "Reservation Days")]
    pub reservation_days: Option<f64>,
    #[serde(rename = "Occupancy Rate")]
    pub occupancy_rate: Option<f64>,
    #[serde(rename = "Revenue (USD)")]
    pub revenue_usd: Option<f64>,
    #[serde(rename = "Revenue (Native)")]
    pub revenue_native: Option<f64>,
    #[serde(rename = "ADR (USD)")]
    pub adr_usd: Option<f64>,
    #[serde(rename = "ADR (Native)")]
    pub adr_native: Option<f64>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "Reporting Month")]
    pub reporting_month: NaiveDate,
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Ok(true),
        "false" | "f" | "0" | "no" | "" => Ok(false),
        other => Err(de::Error::custom(format!("invalid Active flag '{other}'"))),
    }
}

/// The three reported metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Adr,
    Occupancy,
    RevPar,
}

impl Metric {
    /// Stacking order of metric blocks in the report.
    pub const REPORT_ORDER: [Metric; 3] = [Metric::Adr, Metric::Occupancy, Metric::RevPar];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Adr => "ADR",
            Metric::Occupancy => "OCC",
            Metric::RevPar => "RevPAR",
        }
    }
}

/// A labelled row of region values, aligned with [`REGION_COLUMNS`].
///
/// `None` means no data; it is never the same as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub label: String,
    pub values: [Option<f64>; REGION_COLUMNS.len()],
}

impl MetricRow {
    /// A row with every column missing.
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: [None; REGION_COLUMNS.len()],
        }
    }

    /// Looks up a value by column name.
    pub fn get(&self, column: &str) -> Option<f64> {
        REGION_COLUMNS
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.values[i])
    }

    pub fn national(&self) -> Option<f64> {
        self.values[0]
    }
}

/// An ordered table of metric rows, keyed by period label (`YYYY.MM` or `YYYY.Qn`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTable {
    pub rows: Vec<MetricRow>,
}

impl MetricTable {
    pub fn push(&mut self, row: MetricRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }
}

/// One month's occupancy, ADR and RevPAR rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySnapshot {
    pub occupancy: MetricRow,
    pub adr: MetricRow,
    pub revpar: MetricRow,
}

/// Three aligned tables, one per metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTables {
    pub occupancy: MetricTable,
    pub adr: MetricTable,
    pub revpar: MetricTable,
}

impl MetricTables {
    pub fn get(&self, metric: Metric) -> &MetricTable {
        match metric {
            Metric::Adr => &self.adr,
            Metric::Occupancy => &self.occupancy,
            Metric::RevPar => &self.revpar,
        }
    }
}

/// The final text report: one row per metric and period.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    /// Rows belonging to a single metric block.
    pub fn metric_rows(&self, metric: Metric) -> impl Iterator<Item = &Vec<String>> {
        self.rows
            .iter()
            .filter(move |r| r.first().map(String::as_str) == Some(metric.label()))
    }
}
