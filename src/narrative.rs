//! Trend narration for ranked profitability series.
//!
//! Each selected company gets a block: a heading in the company's palette
//! color followed by one sentence per period. A sentence either states the
//! profitability level or, when the company has a value for the preceding
//! ranked period, the change from it and the level reached.

use crate::palette::{classify_change, classify_level, company_color, Tone};
use crate::ranking::{select_top_companies, trend_series, RankedEntry};
use crate::schema::Period;
use crate::utils::format_percentage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increased,
    Decreased,
}

impl TrendDirection {
    /// A zero change reads as a decrease.
    pub fn of(diff: f64) -> Self {
        if diff > 0.0 {
            Self::Increased
        } else {
            Self::Decreased
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Increased => "increased",
            Self::Decreased => "decreased",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrendChange {
    /// Signed difference from the previous period, in percentage points.
    pub diff: f64,
    pub direction: TrendDirection,
    pub tone: Tone,
}

impl TrendChange {
    pub fn between(previous: f64, current: f64) -> Self {
        let diff = current - previous;
        Self {
            diff,
            direction: TrendDirection::of(diff),
            tone: classify_change(diff),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NarrativeLine {
    pub period: Period,
    pub period_label: String,
    pub profitability: Option<f64>,
    pub level_tone: Option<Tone>,
    pub change: Option<TrendChange>,
}

impl NarrativeLine {
    pub fn to_text(&self) -> String {
        let Some(level) = self.profitability else {
            return format!("{}: profitability not available.", self.period_label);
        };
        match &self.change {
            Some(change) => format!(
                "{}: profitability {} by {}, reaching {}.",
                self.period_label,
                change.direction.verb(),
                format_percentage(change.diff.abs()),
                format_percentage(level)
            ),
            None => format!(
                "{}: profitability of {}.",
                self.period_label,
                format_percentage(level)
            ),
        }
    }

    pub fn to_html(&self) -> String {
        let label = escape_html(&self.period_label);
        let (Some(level), Some(level_tone)) = (self.profitability, self.level_tone) else {
            return format!("<p><strong>{}</strong>: profitability not available.</p>", label);
        };
        let level = tagged(level_tone, &format_percentage(level));
        match &self.change {
            Some(change) => format!(
                "<p><strong>{}</strong>: profitability {} by {}, reaching {}.</p>",
                label,
                change.direction.verb(),
                tagged(change.tone, &format_percentage(change.diff.abs())),
                level
            ),
            None => format!("<p><strong>{}</strong>: profitability of {}.</p>", label, level),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompanyNarrative {
    pub company: String,
    pub color: String,
    pub lines: Vec<NarrativeLine>,
}

impl CompanyNarrative {
    pub fn heading_html(&self) -> String {
        format!(
            "<h4 style=\"color: {};\">{}</h4>",
            self.color,
            escape_html(&self.company)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Narrative {
    pub blocks: Vec<CompanyNarrative>,
}

impl Narrative {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn color_map(&self) -> BTreeMap<String, String> {
        self.blocks
            .iter()
            .map(|b| (b.company.clone(), b.color.clone()))
            .collect()
    }

    pub fn to_html(&self) -> String {
        self.blocks
            .iter()
            .flat_map(|block| {
                iter::once(block.heading_html()).chain(block.lines.iter().map(NarrativeLine::to_html))
            })
            .map(|line| line + "\n")
            .collect()
    }

    /// Plain-text rendering: the company name, then its sentences indented.
    pub fn to_text(&self) -> String {
        self.blocks
            .iter()
            .flat_map(|block| {
                iter::once(block.company.clone())
                    .chain(block.lines.iter().map(|line| format!("  {}", line.to_text())))
            })
            .map(|line| line + "\n")
            .collect()
    }
}

pub struct NarrativeGenerator {
    companies: usize,
}

impl NarrativeGenerator {
    pub fn new(companies: usize) -> Self {
        Self { companies }
    }

    pub fn generate(&self, ranked: &[RankedEntry]) -> Narrative {
        let blocks = select_top_companies(ranked, self.companies)
            .into_iter()
            .enumerate()
            .map(|(idx, company)| {
                let lines = narrate_series(&trend_series(ranked, &company));
                CompanyNarrative {
                    company,
                    color: company_color(idx).to_string(),
                    lines,
                }
            })
            .collect();

        Narrative { blocks }
    }
}

fn narrate_series(series: &[&RankedEntry]) -> Vec<NarrativeLine> {
    let mut previous: Option<f64> = None;
    let mut lines = Vec::with_capacity(series.len());

    for entry in series {
        let current = entry.mean_profitability;
        lines.push(NarrativeLine {
            period: entry.period,
            period_label: entry.period.label(),
            profitability: current,
            level_tone: current.map(classify_level),
            change: previous
                .zip(current)
                .map(|(prev, cur)| TrendChange::between(prev, cur)),
        });
        // An unknown value breaks the chain; the next line starts fresh.
        previous = current;
    }

    lines
}

fn tagged(tone: Tone, text: &str) -> String {
    format!("<span class=\"{}\">{}</span>", tone.css_class(), text)
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
