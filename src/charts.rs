use crate::error::Result;
use crate::palette::company_color;
use crate::ranking::{select_top_companies, trend_series, RankedEntry};
use crate::schema::Granularity;
use crate::utils::format_percentage;
use chrono::NaiveDate;
use log::info;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChartPoint {
    pub period_label: String,
    pub period_start: NaiveDate,
    pub value: f64,
    /// Text drawn next to the point, e.g. `20.00%`.
    pub annotation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChartSeries {
    pub company: String,
    pub color: String,
    pub points: Vec<ChartPoint>,
}

/// Everything a chart renderer needs to draw one granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChartPayload {
    pub granularity: Granularity,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
}

impl ChartPayload {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

/// Reference to a rendered chart (a path or URL), as returned by a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Receives chart payloads and hands back where the rendered chart lives.
pub trait ChartSink {
    fn write_chart(&mut self, payload: &ChartPayload) -> Result<ImageRef>;
}

/// Builds the per-company series for the same companies the narrative covers.
/// Entries without a profitability value are left out of the series.
pub fn export_series(
    ranked: &[RankedEntry],
    granularity: Granularity,
    companies: usize,
) -> ChartPayload {
    let series = select_top_companies(ranked, companies)
        .into_iter()
        .enumerate()
        .map(|(idx, company)| {
            let points = trend_series(ranked, &company)
                .into_iter()
                .filter_map(|entry| {
                    entry.mean_profitability.map(|value| ChartPoint {
                        period_label: entry.period.label(),
                        period_start: entry.period.start,
                        value,
                        annotation: format_percentage(value),
                    })
                })
                .collect();
            ChartSeries {
                company,
                color: company_color(idx).to_string(),
                points,
            }
        })
        .collect();

    ChartPayload {
        granularity,
        title: format!("Top companies by revenue: {} profitability", granularity.name()),
        x_label: "Period".to_string(),
        y_label: "Profitability (%)".to_string(),
        series,
    }
}

/// Writes each payload as pretty JSON into a fixed directory, one file per
/// granularity, for an external renderer to pick up.
pub struct JsonChartSink {
    dir: PathBuf,
}

impl JsonChartSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, granularity: Granularity) -> PathBuf {
        self.dir
            .join(format!("profitability_{}.json", granularity.code()))
    }
}

impl ChartSink for JsonChartSink {
    fn write_chart(&mut self, payload: &ChartPayload) -> Result<ImageRef> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(payload.granularity);
        let json = serde_json::to_string_pretty(payload)?;
        fs::write(&path, json)?;
        info!("Wrote {} chart payload to {}", payload.granularity, path.display());
        Ok(ImageRef(path.to_string_lossy().into_owned()))
    }
}
