//! Final report assembly: quarterly summary plus monthly detail per metric.

use crate::analyzers::types::{
    METRIC_COLUMN, Metric, MetricRow, MetricTables, PERIOD_COLUMN, REGION_COLUMNS, ReportTable,
};
use crate::analyzers::utility::round_to;

/// Leading monthly rows covered by the prior-year quarter summary.
const PRIOR_QUARTER_MONTHS: usize = 3;

/// Which quarterly rows precede the monthly detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuarterSummary {
    /// Only the prior-year same-quarter row.
    #[default]
    PriorYear,
    /// Every quarter in the window.
    All,
}

/// Renders one value with the metric's rounding. Missing values become empty cells.
///
/// Occupancy is shown as a percentage with one decimal; ADR and RevPAR as
/// whole currency units. Halves round to even.
pub fn format_value(metric: Metric, value: Option<f64>) -> String {
    let Some(v) = value else {
        return String::new();
    };

    // `+ 0.0` folds negative zero into zero.
    match metric {
        Metric::Occupancy => format!("{:.1}", round_to(v * 100.0, 1) + 0.0),
        Metric::Adr | Metric::RevPar => format!("{:.0}", round_to(v, 0) + 0.0),
    }
}

fn render_row(metric: Metric, row: &MetricRow) -> Vec<String> {
    let mut cells = Vec::with_capacity(REGION_COLUMNS.len() + 2);
    cells.push(metric.label().to_string());
    cells.push(row.label.clone());
    cells.extend(row.values.iter().map(|v| format_value(metric, *v)));
    cells
}

/// The summary rows followed by the monthly rows after the prior-year quarter.
fn refine<'a>(
    quarterly: &'a [MetricRow],
    monthly: &'a [MetricRow],
    summary: QuarterSummary,
) -> impl Iterator<Item = &'a MetricRow> {
    let summary_rows = match summary {
        QuarterSummary::PriorYear => &quarterly[..quarterly.len().min(1)],
        QuarterSummary::All => quarterly,
    };
    let detail_rows = monthly.get(PRIOR_QUARTER_MONTHS..).unwrap_or_default();

    summary_rows.iter().chain(detail_rows)
}

/// Header of the report table.
pub fn report_columns() -> Vec<String> {
    [METRIC_COLUMN, PERIOD_COLUMN]
        .into_iter()
        .chain(REGION_COLUMNS)
        .map(str::to_string)
        .collect()
}

/// Stacks the ADR, OCC and RevPAR blocks into one text table.
pub fn assemble_report(
    quarterly: &MetricTables,
    monthly: &MetricTables,
    summary: QuarterSummary,
) -> ReportTable {
    let rows = Metric::REPORT_ORDER
        .into_iter()
        .flat_map(|metric| {
            refine(
                &quarterly.get(metric).rows,
                &monthly.get(metric).rows,
                summary,
            )
            .map(move |row| render_row(metric, row))
        })
        .collect();

    ReportTable {
        columns: report_columns(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::MetricTable;

    #[test]
    fn test_occupancy_rounding() {
        assert_eq!(format_value(Metric::Occupancy, Some(0.8234)), "82.3");
        assert_eq!(format_value(Metric::Occupancy, Some(0.82)), "82.0");
        assert_eq!(format_value(Metric::Occupancy, Some(0.0)), "0.0");
    }

    #[test]
    fn test_currency_rounding() {
        assert_eq!(format_value(Metric::Adr, Some(105499.6)), "105500");
        assert_eq!(format_value(Metric::RevPar, Some(86_874.2)), "86874");
        assert_eq!(format_value(Metric::Adr, Some(-0.2)), "0");
    }

    #[test]
    fn test_missing_value_is_empty() {
        assert_eq!(format_value(Metric::Adr, None), "");
        assert_eq!(format_value(Metric::Occupancy, None), "");
    }

    fn table(labels: &[&str], national: f64) -> MetricTable {
        MetricTable {
            rows: labels
                .iter()
                .map(|l| {
                    let mut row = MetricRow::empty(*l);
                    row.values[0] = Some(national);
                    row
                })
                .collect(),
        }
    }

    fn window() -> (MetricTables, MetricTables) {
        let months: Vec<String> = (4..=12)
            .map(|m| format!("2023.{m:02}"))
            .chain((1..=6).map(|m| format!("2024.{m:02}")))
            .collect();
        let months: Vec<&str> = months.iter().map(String::as_str).collect();
        let quarters = ["2023.Q2", "2023.Q3", "2023.Q4", "2024.Q1", "2024.Q2"];

        let monthly = MetricTables {
            occupancy: table(&months, 0.61),
            adr: table(&months, 120_000.4),
            revpar: table(&months, 73_200.5),
        };
        let quarterly = MetricTables {
            occupancy: table(&quarters, 0.6),
            adr: table(&quarters, 119_999.5),
            revpar: table(&quarters, 72_000.0),
        };
        (quarterly, monthly)
    }

    #[test]
    fn test_report_layout() {
        let (quarterly, monthly) = window();

        let report = assemble_report(&quarterly, &monthly, QuarterSummary::PriorYear);

        assert_eq!(
            report.columns,
            vec![
                "Index", "시점", "전국", "강원", "경기권", "경남권", "경북권", "부산", "서울",
                "전라권", "제주", "충청권"
            ]
        );
        assert_eq!(report.rows.len(), 39);
        assert!(report.rows.iter().all(|r| r.len() == 12));

        let adr: Vec<_> = report.metric_rows(Metric::Adr).collect();
        assert_eq!(adr.len(), 13);
        assert_eq!(adr[0][1], "2023.Q2");
        assert_eq!(adr[0][2], "120000");
        assert_eq!(adr[1][1], "2023.07");
        assert_eq!(adr[1][2], "120000");
        assert_eq!(adr[1][3], "");
        assert_eq!(adr[12][1], "2024.06");

        let occ: Vec<_> = report.metric_rows(Metric::Occupancy).collect();
        assert_eq!(occ[0][2], "60.0");
        assert_eq!(occ[1][2], "61.0");

        // Blocks are stacked ADR, OCC, RevPAR.
        assert_eq!(report.rows[0][0], "ADR");
        assert_eq!(report.rows[13][0], "OCC");
        assert_eq!(report.rows[26][0], "RevPAR");
        assert_eq!(report.rows[26][2], "72000");
    }

    #[test]
    fn test_report_with_all_quarters() {
        let (quarterly, monthly) = window();

        let report = assemble_report(&quarterly, &monthly, QuarterSummary::All);

        let revpar: Vec<_> = report.metric_rows(Metric::RevPar).collect();
        assert_eq!(revpar.len(), 17);
        assert_eq!(revpar[4][1], "2024.Q2");
        assert_eq!(revpar[5][1], "2023.07");
    }

    #[test]
    fn test_short_window_does_not_panic() {
        let monthly = MetricTables {
            occupancy: table(&["2024.01", "2024.02"], 0.5),
            adr: table(&["2024.01", "2024.02"], 1.0),
            revpar: table(&["2024.01", "2024.02"], 0.5),
        };
        let quarterly = MetricTables::default();

        let report = assemble_report(&quarterly, &monthly, QuarterSummary::PriorYear);

        assert!(report.rows.is_empty());
    }
}
