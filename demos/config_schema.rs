use profitability_report_builder::{ProfitabilityReport, ReportConfig};

fn main() -> anyhow::Result<()> {
    println!("Report configuration schema:\n{}", ReportConfig::schema_as_json()?);
    println!("\nReport output schema:\n{}", ProfitabilityReport::schema_as_json()?);

    let config = ReportConfig::from_json(r#"{ "top_n": 5, "date_order": "month_first" }"#)?;
    println!("\nParsed configuration: {:?}", config);
    Ok(())
}
