//! # Profitability Report Builder
//!
//! A library for turning a billing ledger (date, company, billed total, paid
//! total) into a weekly, monthly and annual profitability report: the top
//! companies by revenue in each period, a color-tagged narrative of how their
//! profitability moved, and chart-ready series.
//!
//! ## Pipeline
//!
//! - **Ingestion**: reads the delimited, Latin-1 ledger and checks the required columns
//! - **Normalization**: coerces cells, fills interior gaps linearly, drops unusable rows
//! - **Aggregation**: sums revenue and averages profitability per `(period, company)`
//! - **Ranking**: keeps the top N companies by revenue in every period
//! - **Narrative**: describes each selected company's trend, period by period
//! - **Charts**: shapes the same trends into series for an external renderer
//!
//! Each granularity is computed independently; a granularity without data
//! yields an "insufficient data" section instead of failing the report.
//!
//! ## Example
//!
//! ```rust,ignore
//! use profitability_report_builder::*;
//! use std::path::Path;
//!
//! let config = ReportConfig::default();
//! let mut sink = JsonChartSink::new("charts");
//!
//! let report = ProfitabilityReporter::process_file(
//!     Path::new("ledger.csv"),
//!     &config,
//!     Some(&mut sink),
//! )
//! .unwrap();
//!
//! if let Some(section) = report.section(Granularity::Monthly) {
//!     println!("{}", section.narrative_html());
//! }
//! ```

pub mod aggregation;
pub mod charts;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod narrative;
pub mod normalizer;
pub mod palette;
pub mod ranking;
pub mod report;
pub mod schema;
pub mod utils;

pub use aggregation::{aggregate, PeriodBucket};
pub use charts::{export_series, ChartPayload, ChartPoint, ChartSeries, ChartSink, ImageRef, JsonChartSink};
pub use engine::{GranularityAnalysis, ReportEngine};
pub use error::{ProfitabilityError, Result};
pub use ingestion::*;
pub use narrative::{CompanyNarrative, Narrative, NarrativeGenerator, NarrativeLine, TrendChange, TrendDirection};
pub use normalizer::{
    normalize_rows, DataOrigin, FinancialRecord, NormalizedLedger, RecordNormalizer, RejectedRow,
    RejectionReason,
};
pub use palette::{classify_change, classify_level, Tone};
pub use ranking::{rank_top_n, select_top_companies, RankedEntry};
pub use report::{NormalizationSummary, ProfitabilityReport, ReportSection, SectionOutcome};
pub use schema::*;

use log::{debug, info};
use std::io::Read;
use std::path::Path;

pub struct ProfitabilityReporter;

impl ProfitabilityReporter {
    pub fn process_rows(
        rows: &[RawRow],
        config: &ReportConfig,
        sink: Option<&mut dyn ChartSink>,
    ) -> Result<ProfitabilityReport> {
        config.validate()?;

        info!("Building profitability report from {} ledger rows", rows.len());

        let ledger = RecordNormalizer::new(config).normalize(rows);
        debug!(
            "Normalization kept {} records, rejected {}, interpolated {} values",
            ledger.records.len(),
            ledger.rejected.len(),
            ledger.interpolated_values
        );

        let sections = ReportEngine::new(config).build_sections(&ledger.records, sink)?;

        let ready = sections.iter().filter(|s| s.is_ready()).count();
        info!(
            "Profitability report ready: {} of {} sections have data",
            ready,
            sections.len()
        );

        Ok(ProfitabilityReport {
            summary: NormalizationSummary::new(rows.len(), &ledger),
            sections,
        })
    }

    pub fn process_reader<R: Read>(
        reader: R,
        config: &ReportConfig,
        sink: Option<&mut dyn ChartSink>,
    ) -> Result<ProfitabilityReport> {
        config.validate()?;
        let rows = read_ledger(reader, config)?;
        Self::process_rows(&rows, config, sink)
    }

    pub fn process_file(
        path: &Path,
        config: &ReportConfig,
        sink: Option<&mut dyn ChartSink>,
    ) -> Result<ProfitabilityReport> {
        config.validate()?;
        let rows = read_ledger_file(path, config)?;
        Self::process_rows(&rows, config, sink)
    }
}

pub fn build_report(rows: &[RawRow], config: &ReportConfig) -> Result<ProfitabilityReport> {
    ProfitabilityReporter::process_rows(rows, config, None)
}
