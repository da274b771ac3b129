use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Company colors, assigned in selection order.
pub const COMPANY_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Upper bound (inclusive) of the caution band, in percent.
pub const CAUTION_CEILING_PCT: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Negative,
    Caution,
    Positive,
}

impl Tone {
    pub fn css_class(&self) -> &'static str {
        match self {
            Tone::Negative => "negative",
            Tone::Caution => "caution",
            Tone::Positive => "positive",
        }
    }
}

/// Wraps around when more companies than colors are selected.
pub fn company_color(index: usize) -> &'static str {
    COMPANY_PALETTE[index % COMPANY_PALETTE.len()]
}

/// Tone of a profitability level: below zero, up to the caution ceiling, above it.
pub fn classify_level(profitability_pct: f64) -> Tone {
    if profitability_pct < 0.0 {
        Tone::Negative
    } else if profitability_pct <= CAUTION_CEILING_PCT {
        Tone::Caution
    } else {
        Tone::Positive
    }
}

/// Tone of a period-over-period change. Only a strictly positive change is positive.
pub fn classify_change(diff: f64) -> Tone {
    if diff > 0.0 {
        Tone::Positive
    } else {
        Tone::Negative
    }
}
