use crate::charts::{ChartPayload, ImageRef};
use crate::narrative::{escape_html, Narrative};
use crate::normalizer::{NormalizedLedger, RejectedRow};
use crate::ranking::RankedEntry;
use crate::schema::Granularity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome {
    Ready {
        ranked: Vec<RankedEntry>,
        narrative: Narrative,
        narrative_html: String,
        chart: ChartPayload,
        /// Where the chart renderer put the image; absent when nothing was rendered.
        image: Option<ImageRef>,
    },
    InsufficientData {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportSection {
    pub granularity: Granularity,
    #[serde(flatten)]
    pub outcome: SectionOutcome,
}

impl ReportSection {
    pub fn insufficient(granularity: Granularity) -> Self {
        Self {
            granularity,
            outcome: SectionOutcome::InsufficientData {
                message: format!(
                    "Not enough data to analyze {} profitability.",
                    granularity.name()
                ),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.outcome, SectionOutcome::Ready { .. })
    }

    /// HTML fragment for the page template; a notice when data was insufficient.
    pub fn narrative_html(&self) -> String {
        match &self.outcome {
            SectionOutcome::Ready { narrative_html, .. } => narrative_html.clone(),
            SectionOutcome::InsufficientData { message } => {
                format!("<p class=\"insufficient-data\">{}</p>", escape_html(message))
            }
        }
    }

    pub fn narrative(&self) -> Option<&Narrative> {
        match &self.outcome {
            SectionOutcome::Ready { narrative, .. } => Some(narrative),
            SectionOutcome::InsufficientData { .. } => None,
        }
    }

    pub fn chart(&self) -> Option<&ChartPayload> {
        match &self.outcome {
            SectionOutcome::Ready { chart, .. } => Some(chart),
            SectionOutcome::InsufficientData { .. } => None,
        }
    }

    pub fn image(&self) -> Option<&ImageRef> {
        match &self.outcome {
            SectionOutcome::Ready { image, .. } => image.as_ref(),
            SectionOutcome::InsufficientData { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizationSummary {
    pub rows_read: usize,
    pub records_kept: usize,
    pub interpolated_values: usize,
    pub rejected: Vec<RejectedRow>,
}

impl NormalizationSummary {
    pub fn new(rows_read: usize, ledger: &NormalizedLedger) -> Self {
        Self {
            rows_read,
            records_kept: ledger.records.len(),
            interpolated_values: ledger.interpolated_values,
            rejected: ledger.rejected.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfitabilityReport {
    pub summary: NormalizationSummary,
    pub sections: Vec<ReportSection>,
}

impl ProfitabilityReport {
    pub fn section(&self, granularity: Granularity) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.granularity == granularity)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(ProfitabilityReport))
    }
}
