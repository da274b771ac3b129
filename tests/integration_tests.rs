use profitability_report_builder::*;
use std::fs;

const HEADER: &str = "Date,Account name,Billed total,Paid total\n";

fn ledger(rows: &[&str]) -> String {
    let mut text = HEADER.to_string();
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

fn run(text: &str) -> ProfitabilityReport {
    ProfitabilityReporter::process_reader(text.as_bytes(), &ReportConfig::default(), None)
        .expect("report should build")
}

fn ranked(section: &ReportSection) -> &[RankedEntry] {
    match &section.outcome {
        SectionOutcome::Ready { ranked, .. } => ranked,
        SectionOutcome::InsufficientData { message } => panic!("section not ready: {}", message),
    }
}

#[test]
fn test_header_only_ledger_gives_insufficient_sections() {
    let report = run(HEADER);

    assert_eq!(report.summary.rows_read, 0);
    assert_eq!(report.sections.len(), 3);
    for granularity in Granularity::ALL {
        let section = report.section(granularity).unwrap();
        assert!(!section.is_ready());
        assert!(section.image().is_none());
    }
    assert_eq!(
        report.section(Granularity::Yearly).unwrap().narrative_html(),
        "<p class=\"insufficient-data\">Not enough data to analyze annual profitability.</p>"
    );
}

#[test]
fn test_missing_columns_abort_the_report() {
    let text = "Date,Account name,Billed total\n2023-01-02,Acme,1000\n";
    let err = ProfitabilityReporter::process_reader(text.as_bytes(), &ReportConfig::default(), None)
        .unwrap_err();

    match err {
        ProfitabilityError::SchemaMismatch { missing } => {
            assert_eq!(missing, vec!["Paid total".to_string()]);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_latin1_company_names_survive() {
    let mut bytes = HEADER.as_bytes().to_vec();
    bytes.extend_from_slice(b"2023-01-02,Caf\xe9 Noir,1000,800\n");

    let report =
        ProfitabilityReporter::process_reader(bytes.as_slice(), &ReportConfig::default(), None)
            .unwrap();

    let monthly = report.section(Granularity::Monthly).unwrap();
    assert_eq!(ranked(monthly)[0].company, "Café Noir");
    assert!(monthly
        .narrative_html()
        .contains("<h4 style=\"color: #1f77b4;\">Café Noir</h4>"));
}

#[test]
fn test_rows_past_horizon_are_excluded() {
    let report = run(&ledger(&[
        "2023-06-05,Acme,1000,800",
        "2025-01-06,Acme,5000,100",
    ]));

    assert_eq!(report.summary.records_kept, 1);
    assert_eq!(report.summary.rejected.len(), 1);
    assert_eq!(report.summary.rejected[0].line, 2);
    assert!(matches!(
        report.summary.rejected[0].reason,
        RejectionReason::BeyondHorizon { year: 2025 }
    ));

    let yearly = ranked(report.section(Granularity::Yearly).unwrap());
    assert_eq!(yearly.len(), 1);
    assert_eq!(yearly[0].period.label(), "2023");
    assert!((yearly[0].total_revenue - 1000.0).abs() < 1e-9);
}

#[test]
fn test_interior_gap_is_filled_and_leading_gap_dropped() {
    let report = run(&ledger(&[
        "2023-01-02,Acme,N/A,500",
        "2023-01-09,Acme,1000,800",
        "2023-01-16,Acme,N/A,850",
        "2023-01-23,Acme,1200,900",
    ]));

    assert_eq!(report.summary.rows_read, 4);
    assert_eq!(report.summary.records_kept, 3);
    // Revenue and profitability of row 3.
    assert_eq!(report.summary.interpolated_values, 2);
    assert_eq!(report.summary.rejected.len(), 1);
    assert_eq!(report.summary.rejected[0].line, 1);
    assert_eq!(report.summary.rejected[0].reason, RejectionReason::MissingRevenue);

    let weekly = ranked(report.section(Granularity::Weekly).unwrap());
    let labels: Vec<String> = weekly.iter().map(|e| e.period.label()).collect();
    assert_eq!(labels, vec!["2023-W02", "2023-W03", "2023-W04"]);

    let filled = &weekly[1];
    assert!((filled.total_revenue - 1100.0).abs() < 1e-9);
    // Midway between the neighbours' 20% and 25%.
    assert!((filled.mean_profitability.unwrap() - 22.5).abs() < 1e-9);
}

#[test]
fn test_day_first_dates_are_bucketed() {
    let report = run(&ledger(&["02/01/2023,Acme,1000,800", "09/01/2023,Acme,1000,900"]));

    let weekly = report.section(Granularity::Weekly).unwrap();
    let text = weekly.narrative().unwrap().to_text();
    assert!(text.contains("2023-W01: profitability of 20.00%."));
    assert!(text.contains("2023-W02: profitability decreased by 10.00%, reaching 10.00%."));
}

#[test]
fn test_only_top_companies_are_ranked_per_period() {
    let rows: Vec<String> = (1..=12)
        .map(|i| format!("2023-03-06,Company {:02},{},{}", i, i * 100, i * 50))
        .collect();
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let report = run(&ledger(&row_refs));

    let monthly = ranked(report.section(Granularity::Monthly).unwrap());
    assert_eq!(monthly.len(), 10);

    let ranks: Vec<usize> = monthly.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, (1..=10).collect::<Vec<_>>());
    assert_eq!(monthly[0].company, "Company 12");
    assert!(monthly
        .windows(2)
        .all(|w| w[0].total_revenue >= w[1].total_revenue));
    assert!(!monthly.iter().any(|e| e.company == "Company 01" || e.company == "Company 02"));

    let narrative = report
        .section(Granularity::Monthly)
        .unwrap()
        .narrative()
        .unwrap();
    assert_eq!(narrative.blocks.len(), 10);
    assert_eq!(narrative.blocks[0].color, "#1f77b4");
    assert_eq!(narrative.blocks[9].color, "#17becf");
}

#[test]
fn test_reports_are_deterministic() {
    let text = ledger(&[
        "2023-01-02,Acme,1000,800",
        "2023-01-03,Beta,1000,950",
        "2023-02-06,Acme,1500,1200",
        "2023-02-07,Beta,N/A,1000",
        "2023-03-06,Beta,2000,1500",
    ]);

    let first = run(&text).to_json().unwrap();
    let second = run(&text).to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_json_chart_sink_writes_one_file_per_granularity() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonChartSink::new(dir.path().join("charts"));
    let text = ledger(&["2023-01-02,Acme,1000,800", "2023-02-06,Acme,1000,700"]);

    let report =
        ProfitabilityReporter::process_reader(text.as_bytes(), &ReportConfig::default(), Some(&mut sink))
            .unwrap();

    for granularity in Granularity::ALL {
        let path = sink.path_for(granularity);
        assert!(path.exists(), "missing chart payload {}", path.display());

        let section = report.section(granularity).unwrap();
        assert_eq!(
            section.image().map(ImageRef::as_str),
            Some(path.to_string_lossy().as_ref())
        );

        let payload: ChartPayload = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(Some(&payload), section.chart());
    }
}

#[test]
fn test_file_processing_with_custom_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");
    fs::write(
        &path,
        "Date;Account name;Billed total;Paid total\n2023-01-02;Acme;1000;800\n",
    )
    .unwrap();

    let config = ReportConfig {
        delimiter: ';',
        ..ReportConfig::default()
    };
    let report = ProfitabilityReporter::process_file(&path, &config, None).unwrap();
    assert!(report.sections.iter().all(|s| s.is_ready()));
}
