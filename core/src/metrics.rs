//! The dashboard metrics bag handed whole to the presentation layer.
//!
//! JSON keys keep the dashboard's names so existing widgets bind
//! unchanged.

use crate::{
    error::GapResult,
    ranking::RankedStore,
    rollup::GroupRollup,
    types::{GroupId, RegionId},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricsBag {
    #[serde(rename = "lacuna_total_rl")]
    pub total_gap_revenue: f64,
    #[serde(rename = "lacuna_total_cupom")]
    pub total_gap_coupon: f64,
    #[serde(rename = "lacuna_total_bm")]
    pub total_gap_ticket: f64,
    #[serde(rename = "percentual_captura")]
    pub capture_percentage: f64,
    #[serde(rename = "total_lojas")]
    pub store_count: usize,
    /// Stores with a negative revenue gap.
    #[serde(rename = "lojas_com_lacuna")]
    pub stores_with_gap: usize,
    /// Stores with a positive revenue gap.
    #[serde(rename = "lojas_acima_meta")]
    pub stores_above_target: usize,
    #[serde(rename = "top_oportunidades")]
    pub top_opportunities: Vec<RankedStore>,
    #[serde(rename = "top_destaques")]
    pub top_performers: Vec<RankedStore>,
    #[serde(rename = "analise_clusters")]
    pub cluster_rollup: Vec<GroupRollup<GroupId>>,
    /// Present only when the daily table has a region column.
    #[serde(rename = "analise_gr", skip_serializing_if = "Option::is_none")]
    pub region_rollup: Option<Vec<GroupRollup<RegionId>>>,
}

/// Wire form of a metrics computation: the bag, or `{"error": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MetricsReport {
    Ok(MetricsBag),
    Failed { error: String },
}

impl From<GapResult<MetricsBag>> for MetricsReport {
    fn from(result: GapResult<MetricsBag>) -> Self {
        match result {
            Ok(bag) => Self::Ok(bag),
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }
}
