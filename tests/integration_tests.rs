use airdna_report::analyzers::analyzer::{AnalysisOptions, analyze_performance};
use airdna_report::analyzers::periods::{format_period, generate_periods};
use airdna_report::analyzers::report::QuarterSummary;
use airdna_report::analyzers::types::Metric;
use airdna_report::output::write_report;
use airdna_report::parser::read_performance_file;
use std::fmt::Write;

const HEADER: &str = "Property ID,Active,Available Days,Reservation Days,Occupancy Rate,\
Revenue (USD),Revenue (Native),ADR (USD),ADR (Native),City,State,Reporting Month";

/// Ten Seoul and ten Busan listings per month; February 2024 has no active listings.
fn synthetic_export() -> String {
    let mut csv = format!("{HEADER}\n");
    for period in generate_periods("2024.Q2").unwrap() {
        let month = format_period(period);
        let active = month != "2024-02-01";
        for (city, base, occ) in [("Seoul", 100_000.0, 0.5), ("Busan", 200_000.0, 0.8)] {
            for i in 0..10 {
                let adr = base + (i * 10) as f64;
                let revenue = adr * 10.0;
                writeln!(
                    csv,
                    "{city}-{i},{active},30,10,{occ},{usd},{revenue},{adr_usd},{adr},{city},{city},{month}",
                    usd = revenue / 1300.0,
                    adr_usd = adr / 1300.0,
                )
                .unwrap();
            }
        }
    }
    csv
}

#[test]
fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("kr_monthly_2024-06.csv");
    std::fs::write(&input, synthetic_export()).unwrap();

    let records = read_performance_file(&input).unwrap();
    assert_eq!(records.len(), 15 * 20);

    let report = analyze_performance(&records, "2024.Q2", &AnalysisOptions::default()).unwrap();

    assert_eq!(
        report.columns,
        vec![
            "Index", "시점", "전국", "강원", "경기권", "경남권", "경북권", "부산", "서울", "전라권",
            "제주", "충청권"
        ]
    );
    assert_eq!(report.rows.len(), 3 * 13);

    let adr: Vec<_> = report.metric_rows(Metric::Adr).collect();
    assert_eq!(adr.len(), 13);
    assert_eq!(adr[0][1], "2023.Q2");
    assert_eq!(adr[0][2], "150045");
    assert_eq!(adr[0][3], "");
    assert_eq!(adr[0][7], "200040");
    assert_eq!(adr[0][8], "100050");
    assert_eq!(adr[1][1], "2023.07");
    assert_eq!(adr[12][1], "2024.06");

    let february = adr.iter().find(|r| r[1] == "2024.02").unwrap();
    assert!(february[2..].iter().all(String::is_empty));

    let occ: Vec<_> = report.metric_rows(Metric::Occupancy).collect();
    assert_eq!(occ[0][2], "65.0");
    assert_eq!(occ[0][8], "50.0");

    let revpar: Vec<_> = report.metric_rows(Metric::RevPar).collect();
    assert_eq!(revpar[0][8], "50025");
    assert_eq!(revpar[0][7], "160032");

    let output = dir.path().join("out").join("report.csv");
    write_report(&output, &report, "utf-8").unwrap();

    let mut rdr = csv::Reader::from_path(&output).unwrap();
    assert_eq!(rdr.headers().unwrap().len(), 12);
    assert_eq!(rdr.records().count(), 39);

    write_report(&dir.path().join("report_cp949.csv"), &report, "cp949").unwrap();
}

#[test]
fn test_all_quarters_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("kr_monthly_2024-06.csv");
    std::fs::write(&input, synthetic_export()).unwrap();
    let records = read_performance_file(&input).unwrap();

    let options = AnalysisOptions {
        summary: QuarterSummary::All,
        ..Default::default()
    };
    let report = analyze_performance(&records, "2024Q2", &options).unwrap();

    let adr: Vec<_> = report.metric_rows(Metric::Adr).collect();
    let labels: Vec<&str> = adr.iter().map(|r| r[1].as_str()).collect();
    assert_eq!(
        &labels[..6],
        &["2023.Q2", "2023.Q3", "2023.Q4", "2024.Q1", "2024.Q2", "2023.07"]
    );
    // 2024.Q1 averages January and March only.
    assert_eq!(adr[3][2], "150045");
}
