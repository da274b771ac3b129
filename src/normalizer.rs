use crate::ingestion::RawRow;
use crate::schema::{InterpolationOrder, ReportConfig};
use crate::utils::{interpolate_interior, parse_amount, parse_ledger_date};
use chrono::{Datelike, NaiveDate};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DataOrigin {
    /// Every numeric value came straight from the ledger row
    Observed,
    /// At least one of revenue, cost or profitability was filled from neighbouring rows
    Interpolated,
}

/// A validated ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialRecord {
    pub line: usize,
    pub date: NaiveDate,
    pub company: String,
    pub revenue: f64,
    pub cost: f64,
    pub profitability_pct: Option<f64>,
    pub origin: DataOrigin,
}

impl FinancialRecord {
    pub fn profit(&self) -> f64 {
        self.revenue - self.cost
    }

    /// Profitability straight from revenue and cost, ignoring any interpolation.
    pub fn computed_profitability(&self) -> Option<f64> {
        profitability(Some(self.revenue), Some(self.cost))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    MissingDate,
    BeyondHorizon { year: i32 },
    MissingRevenue,
    MissingCost,
    MissingCompany,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RejectedRow {
    pub line: usize,
    #[serde(flatten)]
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NormalizedLedger {
    pub records: Vec<FinancialRecord>,
    pub rejected: Vec<RejectedRow>,
    pub interpolated_values: usize,
}

// Working row between parsing and validation.
struct StagedRow {
    line: usize,
    date: NaiveDate,
    company: Option<String>,
    revenue: Option<f64>,
    cost: Option<f64>,
    profitability: Option<f64>,
    filled: usize,
}

fn profitability(revenue: Option<f64>, cost: Option<f64>) -> Option<f64> {
    let (revenue, cost) = (revenue?, cost?);
    let pct = (revenue - cost) / revenue * 100.0;
    pct.is_finite().then_some(pct)
}

pub struct RecordNormalizer<'a> {
    config: &'a ReportConfig,
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, rows: &[RawRow]) -> NormalizedLedger {
        let mut rejected = Vec::new();
        let mut staged: Vec<StagedRow> = Vec::with_capacity(rows.len());

        for row in rows {
            let Some(date) = parse_ledger_date(&row.date, self.config.date_order) else {
                debug!("Row {} has no usable date: {:?}", row.line, row.date);
                rejected.push(RejectedRow {
                    line: row.line,
                    reason: RejectionReason::MissingDate,
                });
                continue;
            };

            let company = row.company.trim();
            let revenue = parse_amount(&row.revenue);
            let cost = parse_amount(&row.cost);
            staged.push(StagedRow {
                line: row.line,
                date,
                company: (!company.is_empty()).then(|| company.to_string()),
                revenue,
                cost,
                profitability: profitability(revenue, cost),
                filled: 0,
            });
        }

        if self.config.interpolation_order == InterpolationOrder::Chronological {
            staged.sort_by_key(|row| row.date);
        }

        // Columns are filled independently; profitability is never
        // re-derived from filled revenue or cost.
        fill_column(&mut staged, |row| &mut row.revenue);
        fill_column(&mut staged, |row| &mut row.cost);
        fill_column(&mut staged, |row| &mut row.profitability);

        let mut interpolated_values = 0;
        let mut records = Vec::with_capacity(staged.len());
        for row in staged {
            let filled = row.filled;
            match self.validate(row) {
                Ok(record) => {
                    interpolated_values += filled;
                    records.push(record);
                }
                Err(rejection) => {
                    debug!("Rejected row {}: {:?}", rejection.line, rejection.reason);
                    rejected.push(rejection);
                }
            }
        }

        rejected.sort_by_key(|r| r.line);
        debug!("Kept {} interpolated values", interpolated_values);

        NormalizedLedger {
            records,
            rejected,
            interpolated_values,
        }
    }

    fn validate(&self, row: StagedRow) -> std::result::Result<FinancialRecord, RejectedRow> {
        let reject = |reason| RejectedRow {
            line: row.line,
            reason,
        };

        if row.date.year() > self.config.horizon_year {
            return Err(reject(RejectionReason::BeyondHorizon {
                year: row.date.year(),
            }));
        }
        let Some(revenue) = row.revenue else {
            return Err(reject(RejectionReason::MissingRevenue));
        };
        let Some(cost) = row.cost else {
            return Err(reject(RejectionReason::MissingCost));
        };
        let Some(company) = row.company else {
            return Err(reject(RejectionReason::MissingCompany));
        };

        Ok(FinancialRecord {
            line: row.line,
            date: row.date,
            company,
            revenue,
            cost,
            profitability_pct: row.profitability,
            origin: if row.filled > 0 {
                DataOrigin::Interpolated
            } else {
                DataOrigin::Observed
            },
        })
    }
}

/// Interior-only fill of one column, counting the filled values per row.
fn fill_column<F>(rows: &mut [StagedRow], field: F)
where
    F: Fn(&mut StagedRow) -> &mut Option<f64>,
{
    let mut column: Vec<Option<f64>> = rows.iter_mut().map(|row| *field(row)).collect();
    if interpolate_interior(&mut column) == 0 {
        return;
    }

    for (row, value) in rows.iter_mut().zip(column) {
        let slot = field(row);
        if slot.is_none() && value.is_some() {
            *slot = value;
            row.filled += 1;
        }
    }
}

pub fn normalize_rows(rows: &[RawRow], config: &ReportConfig) -> NormalizedLedger {
    RecordNormalizer::new(config).normalize(rows)
}
