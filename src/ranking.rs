use crate::aggregation::PeriodBucket;
use crate::schema::Period;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankedEntry {
    pub period: Period,
    pub company: String,
    pub total_revenue: f64,
    pub mean_profitability: Option<f64>,
    /// 1-based position within the period, by revenue.
    pub rank: usize,
}

fn by_revenue_desc(a: &PeriodBucket, b: &PeriodBucket) -> Ordering {
    b.total_revenue
        .total_cmp(&a.total_revenue)
        .then_with(|| a.company.cmp(&b.company))
}

/// Keeps the `n` highest-revenue buckets of every period.
///
/// Ties on revenue go to the alphabetically smaller company. The result is
/// ordered by period, then rank; an empty input gives an empty result.
pub fn rank_top_n(buckets: &[PeriodBucket], n: usize) -> Vec<RankedEntry> {
    let mut by_period: BTreeMap<Period, Vec<&PeriodBucket>> = BTreeMap::new();
    for bucket in buckets {
        by_period.entry(bucket.period).or_default().push(bucket);
    }

    let mut ranked = Vec::new();
    for (_, mut members) in by_period {
        members.sort_by(|a, b| by_revenue_desc(a, b));
        ranked.extend(
            members
                .into_iter()
                .take(n)
                .enumerate()
                .map(|(idx, bucket)| RankedEntry {
                    period: bucket.period,
                    company: bucket.company.clone(),
                    total_revenue: bucket.total_revenue,
                    mean_profitability: bucket.mean_profitability,
                    rank: idx + 1,
                }),
        );
    }

    debug!(
        "Ranked {} of {} buckets (top {} per period)",
        ranked.len(),
        buckets.len(),
        n
    );
    ranked
}

/// The first `limit` distinct companies in ranked order.
///
/// This mostly reflects the earliest period's leaders, not revenue over the
/// whole horizon.
pub fn select_top_companies(ranked: &[RankedEntry], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    ranked
        .iter()
        .filter(|entry| seen.insert(entry.company.as_str()))
        .take(limit)
        .map(|entry| entry.company.clone())
        .collect()
}

/// One company's entries in period order.
pub fn trend_series<'a>(ranked: &'a [RankedEntry], company: &str) -> Vec<&'a RankedEntry> {
    let mut series: Vec<&RankedEntry> = ranked.iter().filter(|e| e.company == company).collect();
    series.sort_by_key(|e| e.period);
    series
}
