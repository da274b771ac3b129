use crate::normalizer::FinancialRecord;
use crate::schema::{Granularity, Period};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Revenue and profitability of one company within one period.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PeriodBucket {
    pub period: Period,
    pub company: String,
    pub total_revenue: f64,
    /// Mean over the records that carry a profitability value.
    pub mean_profitability: Option<f64>,
    pub record_count: usize,
}

impl PeriodBucket {
    pub fn key(&self) -> (Period, &str) {
        (self.period, self.company.as_str())
    }
}

impl PartialEq for PeriodBucket {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PeriodBucket {}

#[derive(Default)]
struct BucketTotals {
    revenue: f64,
    profitability_sum: f64,
    profitability_count: usize,
    records: usize,
}

/// Groups records by `(period, company)`. Buckets come back ordered by period,
/// then company.
pub fn aggregate(records: &[FinancialRecord], granularity: Granularity) -> Vec<PeriodBucket> {
    let mut totals: BTreeMap<(Period, String), BucketTotals> = BTreeMap::new();

    for record in records {
        let period = granularity.period_of(record.date);
        let entry = totals
            .entry((period, record.company.clone()))
            .or_default();

        entry.revenue += record.revenue;
        entry.records += 1;
        if let Some(pct) = record.profitability_pct {
            entry.profitability_sum += pct;
            entry.profitability_count += 1;
        }
    }

    let buckets: Vec<PeriodBucket> = totals
        .into_iter()
        .map(|((period, company), t)| PeriodBucket {
            period,
            company,
            total_revenue: t.revenue,
            mean_profitability: (t.profitability_count > 0)
                .then(|| t.profitability_sum / t.profitability_count as f64),
            record_count: t.records,
        })
        .collect();

    debug!(
        "Aggregated {} records into {} {} buckets",
        records.len(),
        buckets.len(),
        granularity
    );

    buckets
}
