//! Per-store drill-down: the store's gap row, its daily history, how it
//! compares with its comparison group, and a short reading of the gap.

use crate::{
    rollup::ComparisonGroup,
    stats,
    tables::{DailyTable, StoreGap, StoreRecord},
    types::StoreName,
};
use serde::{Deserialize, Serialize};

/// Neighbours shown on each side of the store in the ranking context.
pub const CONTEXT_RADIUS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreDetail {
    pub store_name: StoreName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_data: Option<StoreGap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_data: Option<Vec<StoreRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_comparison: Option<ClusterComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_context: Option<RankingContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<Insight>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterComparison {
    pub cluster_size: usize,
    pub cluster_median_rl: f64,
    pub cluster_mean_rl: f64,
    pub cluster_std_rl: Option<f64>,
    /// Peers with a strictly smaller revenue gap, plus one.
    pub rank_in_cluster: usize,
}

/// Position of the store in its group ordered best to worst.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingContext {
    /// 1-based position, revenue gap descending.
    pub position: usize,
    pub group_size: usize,
    pub percentile: f64,
    pub neighbours: Vec<RankingEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingEntry {
    pub position: usize,
    pub store_name: StoreName,
    pub gap_revenue: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GapDriver {
    /// Fewer sales than the benchmark.
    Coupon,
    /// Lower value per sale than the benchmark.
    Ticket,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    HighOpportunity { driver: GapDriver },
    AboveBenchmark,
    Balanced,
}

impl Insight {
    /// Classify a gap row against `threshold` (absolute revenue).
    pub fn classify(gap: &StoreGap, threshold: f64) -> Self {
        if gap.gap_revenue < -threshold {
            let driver = if gap.gap_coupon.abs() > gap.gap_ticket.abs() {
                GapDriver::Coupon
            } else {
                GapDriver::Ticket
            };
            Self::HighOpportunity { driver }
        } else if gap.gap_revenue > threshold {
            Self::AboveBenchmark
        } else {
            Self::Balanced
        }
    }
}

pub fn build(
    gaps: &[StoreGap],
    daily: &DailyTable,
    store: &str,
    insight_threshold: f64,
) -> StoreDetail {
    let cluster_data = gaps.iter().find(|g| g.store_name == store).cloned();

    let daily_rows: Vec<StoreRecord> = daily.rows_for(store).cloned().collect();
    let daily_data = (!daily_rows.is_empty()).then_some(daily_rows);

    let mut detail = StoreDetail {
        store_name: store.to_string(),
        cluster_data: None,
        daily_data,
        cluster_comparison: None,
        ranking_context: None,
        insight: None,
    };

    if let Some(row) = cluster_data {
        let group = ComparisonGroup::of(gaps, &row.group);
        detail.cluster_comparison = comparison(&group, &row);
        detail.ranking_context = ranking_context(&group, &row);
        detail.insight = Some(Insight::classify(&row, insight_threshold));
        detail.cluster_data = Some(row);
    }
    detail
}

fn comparison(group: &ComparisonGroup<'_>, row: &StoreGap) -> Option<ClusterComparison> {
    let values = group.revenue_gaps();
    Some(ClusterComparison {
        cluster_size: group.size(),
        cluster_median_rl: stats::median(&values)?,
        cluster_mean_rl: stats::mean(&values),
        cluster_std_rl: stats::sample_std(&values),
        rank_in_cluster: group.rank_of(row.gap_revenue),
    })
}

fn ranking_context(group: &ComparisonGroup<'_>, row: &StoreGap) -> Option<RankingContext> {
    let mut ordered = group.members.clone();
    ordered.sort_by(|a, b| b.gap_revenue.total_cmp(&a.gap_revenue));
    let idx = ordered.iter().position(|g| g.store_name == row.store_name)?;

    let size = ordered.len();
    let start = idx.saturating_sub(CONTEXT_RADIUS);
    let end = (idx + CONTEXT_RADIUS + 1).min(size);
    let neighbours = ordered[start..end]
        .iter()
        .enumerate()
        .map(|(i, g)| RankingEntry {
            position: start + i + 1,
            store_name: g.store_name.clone(),
            gap_revenue: g.gap_revenue,
        })
        .collect();

    let position = idx + 1;
    Some(RankingContext {
        position,
        group_size: size,
        percentile: (size - position) as f64 / size as f64 * 100.0,
        neighbours,
    })
}
