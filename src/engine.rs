use crate::aggregation::aggregate;
use crate::charts::{export_series, ChartPayload, ChartSink, ImageRef};
use crate::error::{ProfitabilityError, Result};
use crate::narrative::{Narrative, NarrativeGenerator};
use crate::normalizer::FinancialRecord;
use crate::ranking::{rank_top_n, RankedEntry};
use crate::report::{ReportSection, SectionOutcome};
use crate::schema::{Granularity, ReportConfig};
use log::{debug, info, warn};

/// Ranked table, narrative and chart series for one granularity.
#[derive(Debug, Clone)]
pub struct GranularityAnalysis {
    pub granularity: Granularity,
    pub ranked: Vec<RankedEntry>,
    pub narrative: Narrative,
    pub chart: ChartPayload,
}

pub struct ReportEngine<'a> {
    config: &'a ReportConfig,
}

impl<'a> ReportEngine<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    pub fn analyze(
        &self,
        records: &[FinancialRecord],
        granularity: Granularity,
    ) -> Result<GranularityAnalysis> {
        let buckets = aggregate(records, granularity);
        if buckets.is_empty() {
            return Err(ProfitabilityError::InsufficientData { granularity });
        }

        let ranked = rank_top_n(&buckets, self.config.top_n);
        let narrative =
            NarrativeGenerator::new(self.config.narrated_companies).generate(&ranked);
        let chart = export_series(&ranked, granularity, self.config.narrated_companies);

        debug!(
            "{} analysis: {} buckets, {} ranked entries, {} narrated companies",
            granularity,
            buckets.len(),
            ranked.len(),
            narrative.blocks.len()
        );

        Ok(GranularityAnalysis {
            granularity,
            ranked,
            narrative,
            chart,
        })
    }

    /// Builds one report section. Insufficient data and chart sink failures
    /// stay local to the section.
    pub fn build_section(
        &self,
        records: &[FinancialRecord],
        granularity: Granularity,
        sink: Option<&mut dyn ChartSink>,
    ) -> Result<ReportSection> {
        let analysis = match self.analyze(records, granularity) {
            Ok(analysis) => analysis,
            Err(ProfitabilityError::InsufficientData { granularity }) => {
                info!("Not enough data for the {} report", granularity);
                return Ok(ReportSection::insufficient(granularity));
            }
            Err(e) => return Err(e),
        };

        let image = match sink {
            Some(sink) if !analysis.chart.is_empty() => render_chart(sink, &analysis.chart),
            _ => None,
        };

        let narrative_html = analysis.narrative.to_html();
        Ok(ReportSection {
            granularity,
            outcome: SectionOutcome::Ready {
                ranked: analysis.ranked,
                narrative: analysis.narrative,
                narrative_html,
                chart: analysis.chart,
                image,
            },
        })
    }

    /// One section per granularity, each computed independently.
    pub fn build_sections(
        &self,
        records: &[FinancialRecord],
        mut sink: Option<&mut dyn ChartSink>,
    ) -> Result<Vec<ReportSection>> {
        Granularity::ALL
            .iter()
            .map(|&granularity| self.build_section(records, granularity, sink.as_mut().map(|s| &mut **s as &mut dyn ChartSink)))
            .collect()
    }
}

fn render_chart(sink: &mut dyn ChartSink, chart: &ChartPayload) -> Option<ImageRef> {
    match sink.write_chart(chart) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("Chart for the {} report was not rendered: {}", chart.granularity, e);
            None
        }
    }
}
