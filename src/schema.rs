use crate::error::{ProfitabilityError, Result};
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "PascalCase")]
pub enum Granularity {
    #[schemars(description = "ISO weeks starting on Monday, labelled YYYY-Www")]
    Weekly,

    #[schemars(description = "Calendar months, labelled YYYY-MM")]
    Monthly,

    #[schemars(description = "Calendar years, labelled YYYY")]
    Yearly,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Self::Weekly, Self::Monthly, Self::Yearly];

    /// Short code used for output keys (`W`, `M`, `Y`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::Weekly => "W",
            Self::Monthly => "M",
            Self::Yearly => "Y",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "annual",
        }
    }

    pub fn period_of(&self, date: NaiveDate) -> Period {
        let start = match self {
            Self::Weekly => crate::utils::week_start(date),
            Self::Monthly => crate::utils::month_start(date),
            Self::Yearly => crate::utils::year_start(date),
        };
        Period {
            granularity: *self,
            start,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A calendar period of one granularity, identified by its first day.
///
/// Periods of the same granularity order by their start date.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
pub struct Period {
    pub granularity: Granularity,
    pub start: NaiveDate,
}

impl Period {
    pub fn label(&self) -> String {
        match self.granularity {
            Granularity::Weekly => {
                let week = self.start.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Granularity::Monthly => self.start.format("%Y-%m").to_string(),
            Granularity::Yearly => format!("{}", self.start.year()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    #[default]
    #[schemars(description = "Read ambiguous dates like 02/01/2023 as 2 January 2023")]
    DayFirst,

    #[schemars(description = "Read ambiguous dates like 02/01/2023 as February 1st 2023")]
    MonthFirst,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationOrder {
    #[default]
    #[schemars(
        description = "Fill gaps using neighbouring rows in the order they appear in the ledger"
    )]
    RowOrder,

    #[schemars(
        description = "Stable-sort rows by date first, then fill gaps using chronological neighbours"
    )]
    Chronological,
}

fn default_top_n() -> usize {
    10
}

fn default_narrated_companies() -> usize {
    10
}

fn default_horizon_year() -> i32 {
    2024
}

fn default_delimiter() -> char {
    ','
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ReportConfig {
    #[serde(default = "default_top_n")]
    #[schemars(description = "Number of companies kept per period, ranked by total revenue")]
    pub top_n: usize,

    #[serde(default = "default_narrated_companies")]
    #[schemars(
        description = "Number of distinct companies (in ranked order) that get a narrative and a chart series"
    )]
    pub narrated_companies: usize,

    #[serde(default = "default_horizon_year")]
    #[schemars(description = "Last calendar year accepted from the ledger; later rows are excluded")]
    pub horizon_year: i32,

    #[serde(default)]
    #[schemars(description = "Preferred reading of ambiguous day/month dates")]
    pub date_order: DateOrder,

    #[serde(default)]
    #[schemars(description = "Which neighbours are used when filling missing numeric values")]
    pub interpolation_order: InterpolationOrder,

    #[serde(default = "default_delimiter")]
    #[schemars(description = "Single ASCII character separating ledger columns")]
    pub delimiter: char,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            narrated_companies: default_narrated_companies(),
            horizon_year: default_horizon_year(),
            date_order: DateOrder::default(),
            interpolation_order: InterpolationOrder::default(),
            delimiter: default_delimiter(),
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(ProfitabilityError::InvalidConfig(
                "top_n must be at least 1".to_string(),
            ));
        }
        if self.narrated_companies == 0 {
            return Err(ProfitabilityError::InvalidConfig(
                "narrated_companies must be at least 1".to_string(),
            ));
        }
        if !self.delimiter.is_ascii() {
            return Err(ProfitabilityError::InvalidConfig(format!(
                "delimiter '{}' is not an ASCII character",
                self.delimiter
            )));
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or_else(|| {
                ProfitabilityError::InvalidConfig(format!(
                    "delimiter '{}' is not an ASCII character",
                    self.delimiter
                ))
            })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
