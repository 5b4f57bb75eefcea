//! Opportunity and performer rankings over the cluster gap table.
//!
//! A negative revenue gap means the store sells less than its comparison
//! group's benchmark: that shortfall is the opportunity. Ties keep table
//! order (stable sort, no secondary key).

use crate::{
    tables::StoreGap,
    types::{GroupId, StoreName},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedStore {
    /// 1-based, contiguous.
    pub rank: usize,
    pub store_name: StoreName,
    pub group: GroupId,
    pub gap_revenue: f64,
    /// |gap_revenue|, attached to opportunities only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_revenue_abs: Option<f64>,
    pub gap_coupon: f64,
    pub gap_ticket: f64,
}

/// Stores with `gap_revenue < 0`, most negative first, at most `n`.
pub fn top_opportunities(gaps: &[StoreGap], n: usize) -> Vec<RankedStore> {
    let mut rows: Vec<&StoreGap> = gaps.iter().filter(|g| g.gap_revenue < 0.0).collect();
    rows.sort_by(|a, b| a.gap_revenue.total_cmp(&b.gap_revenue));
    rank(rows, n, true)
}

/// Stores with `gap_revenue > 0`, largest first, at most `n`.
pub fn top_performers(gaps: &[StoreGap], n: usize) -> Vec<RankedStore> {
    let mut rows: Vec<&StoreGap> = gaps.iter().filter(|g| g.gap_revenue > 0.0).collect();
    rows.sort_by(|a, b| b.gap_revenue.total_cmp(&a.gap_revenue));
    rank(rows, n, false)
}

fn rank(rows: Vec<&StoreGap>, n: usize, with_abs: bool) -> Vec<RankedStore> {
    rows.into_iter()
        .take(n)
        .enumerate()
        .map(|(i, g)| RankedStore {
            rank: i + 1,
            store_name: g.store_name.clone(),
            group: g.group.clone(),
            gap_revenue: g.gap_revenue,
            gap_revenue_abs: with_abs.then(|| g.gap_revenue.abs()),
            gap_coupon: g.gap_coupon,
            gap_ticket: g.gap_ticket,
        })
        .collect()
}
