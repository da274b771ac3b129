use anyhow::Context;
use profitability_report_builder::*;
use std::path::PathBuf;

const SAMPLE_LEDGER: &str = "\
Date,Account name,Billed total,Paid total
02/01/2023,Northwind,12000,9000
03/01/2023,Contoso,8000,7600
09/01/2023,Northwind,11000,9900
10/01/2023,Contoso,N/A,7000
16/01/2023,Northwind,13000,9100
17/01/2023,Contoso,9500,7200
06/02/2023,Northwind,12500,12900
07/02/2023,Contoso,9000,8400
06/03/2023,Northwind,14000,10500
07/03/2023,Contoso,10000,9800
15/01/2025,Northwind,99000,1000
";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ReportConfig::default();
    let mut sink = JsonChartSink::new("charts");

    let report = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => ProfitabilityReporter::process_file(&path, &config, Some(&mut sink))
            .with_context(|| format!("failed to build report from {}", path.display()))?,
        None => {
            println!("No ledger given, using the built-in sample.\n");
            ProfitabilityReporter::process_reader(SAMPLE_LEDGER.as_bytes(), &config, Some(&mut sink))
                .context("failed to build report from sample ledger")?
        }
    };

    println!(
        "Rows read: {}, kept: {}, interpolated values: {}, rejected: {}",
        report.summary.rows_read,
        report.summary.records_kept,
        report.summary.interpolated_values,
        report.summary.rejected.len()
    );
    for rejected in &report.summary.rejected {
        println!("  row {}: {:?}", rejected.line, rejected.reason);
    }

    for section in &report.sections {
        println!("\n=== {} ===", section.granularity.name());
        match &section.outcome {
            SectionOutcome::Ready { narrative, .. } => {
                print!("{}", narrative.to_text());
                if let Some(image) = section.image() {
                    println!("chart: {}", image.as_str());
                }
            }
            SectionOutcome::InsufficientData { message } => println!("{}", message),
        }
    }

    Ok(())
}
