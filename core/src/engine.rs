//! GapEngine: every dashboard computation over one loaded dataset.
//!
//! RULES:
//!   - The engine owns immutable copies of its input tables.
//!   - Every public operation is a pure function of those tables.
//!   - "No data" is a valid state: empty tables give empty results.
//!   - Gap figures are validated at the boundary of each operation that
//!     does arithmetic on them; a non-finite value fails that operation.
//!
//! METRICS ORDER (calculate_all_metrics, fixed):
//!   1. Totals: revenue, coupon, ticket gap
//!   2. Capture percentage (configured policy value)
//!   3. Store counters: total, with gap, above target
//!   4. Top opportunities, top performers
//!   5. Cluster rollup
//!   6. Region rollup (only with a region column)

use crate::{
    config::GapConfig,
    consistency::{self, ConsistencyReport, DecompositionMismatch, TicketDecomposition},
    distribution::{self, CorrelationMatrix, FieldSummary},
    error::GapResult,
    filter::GapFilter,
    metrics::MetricsBag,
    ranking::{self, RankedStore},
    rollup::{self, GroupRollup},
    store_detail::{self, StoreDetail},
    tables::{self, DailyTable, StoreGap, TableSet},
    trend::{self, Trends},
    types::{GroupId, RegionId},
    waterfall::Waterfall,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct GapEngine {
    config: GapConfig,
    daily: DailyTable,
    gaps: Vec<StoreGap>,
}

/// Shape of the loaded dataset.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableSummary {
    pub daily_rows: usize,
    pub gap_rows: usize,
    pub stores: usize,
    pub groups: usize,
    pub regions: usize,
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

impl GapEngine {
    /// Build from a table set. Missing tables degrade to empty; this never
    /// fails.
    pub fn new(tables: &TableSet, config: GapConfig) -> Self {
        let daily = tables::take_daily(tables, &config.daily_table);
        let gaps = tables::take_gaps(tables, &config.cluster_table);
        log::debug!(
            "GapEngine loaded {} daily rows, {} gap rows",
            daily.rows.len(),
            gaps.len()
        );
        Self { config, daily, gaps }
    }

    pub fn from_parts(daily: DailyTable, gaps: Vec<StoreGap>, config: GapConfig) -> Self {
        Self { config, daily, gaps }
    }

    pub fn config(&self) -> &GapConfig {
        &self.config
    }

    pub fn daily(&self) -> &DailyTable {
        &self.daily
    }

    pub fn gaps(&self) -> &[StoreGap] {
        &self.gaps
    }

    // ── Top-level ──────────────────────────────────────────────

    pub fn calculate_all_metrics(&self) -> GapResult<MetricsBag> {
        let result = self.compute_metrics();
        match &result {
            Ok(bag) => log::info!(
                "Metrics computed: {} stores, {} with gap, total gap {:.2}",
                bag.store_count,
                bag.stores_with_gap,
                bag.total_gap_revenue
            ),
            Err(e) => log::error!("Metrics computation failed: {e}"),
        }
        result
    }

    fn compute_metrics(&self) -> GapResult<MetricsBag> {
        self.validate_gaps()?;
        let gaps = &self.gaps;

        let total_gap_revenue: f64 = gaps.iter().map(|g| g.gap_revenue).sum();
        let total_gap_coupon: f64 = gaps.iter().map(|g| g.gap_coupon).sum();
        let total_gap_ticket: f64 = gaps.iter().map(|g| g.gap_ticket).sum();

        let stores_with_gap = gaps.iter().filter(|g| g.gap_revenue < 0.0).count();
        let stores_above_target = gaps.iter().filter(|g| g.gap_revenue > 0.0).count();

        let region_rollup = self.daily.columns.region.then(|| self.region_rollup());

        Ok(MetricsBag {
            total_gap_revenue,
            total_gap_coupon,
            total_gap_ticket,
            capture_percentage: self.config.capture_percentage,
            store_count: gaps.len(),
            stores_with_gap,
            stores_above_target,
            top_opportunities: ranking::top_opportunities(gaps, self.config.top_n),
            top_performers: ranking::top_performers(gaps, self.config.top_n),
            cluster_rollup: rollup::by_cluster(gaps),
            region_rollup,
        })
    }

    // ── Rankings ───────────────────────────────────────────────

    pub fn top_opportunities(&self, n: usize) -> GapResult<Vec<RankedStore>> {
        self.validate_gaps()?;
        Ok(ranking::top_opportunities(&self.gaps, n))
    }

    pub fn top_performers(&self, n: usize) -> GapResult<Vec<RankedStore>> {
        self.validate_gaps()?;
        Ok(ranking::top_performers(&self.gaps, n))
    }

    // ── Rollups ────────────────────────────────────────────────

    pub fn analyze_by_cluster(&self) -> GapResult<Vec<GroupRollup<GroupId>>> {
        self.validate_gaps()?;
        Ok(rollup::by_cluster(&self.gaps))
    }

    /// Rollup by region. Empty when no region can be resolved.
    pub fn analyze_by_region(&self) -> GapResult<Vec<GroupRollup<RegionId>>> {
        self.validate_gaps()?;
        Ok(self.region_rollup())
    }

    fn region_rollup(&self) -> Vec<GroupRollup<RegionId>> {
        let index = self.daily.region_index();
        let mut unresolved = 0usize;
        let out = rollup::rollup_by(&self.gaps, |g| {
            let region = g
                .region_id
                .or_else(|| index.get(g.store_name.as_str()).copied());
            if region.is_none() {
                unresolved += 1;
            }
            region
        });
        if unresolved > 0 {
            log::warn!("{unresolved} stores have no region and are left out of the region rollup");
        }
        out
    }

    // ── Waterfall ──────────────────────────────────────────────

    /// Decomposition of one store (`Some(name)`) or of the whole table.
    /// `Ok(None)` for an unknown store or an empty table.
    pub fn waterfall(&self, store: Option<&str>) -> GapResult<Option<Waterfall>> {
        self.validate_gaps()?;
        let result = match store {
            Some(name) => Waterfall::for_store(&self.gaps, name),
            None => Waterfall::aggregate(&self.gaps),
        };
        if let Some(w) = &result {
            if w.residual().abs() > self.config.consistency_tolerance {
                log::debug!(
                    "Waterfall for {:?}: components differ from total by {:.2}",
                    store,
                    w.residual()
                );
            }
        }
        Ok(result)
    }

    // ── Store detail ───────────────────────────────────────────

    pub fn store_details(&self, store: &str) -> GapResult<StoreDetail> {
        self.validate_gaps()?;
        Ok(store_detail::build(
            &self.gaps,
            &self.daily,
            store,
            self.config.insight_threshold,
        ))
    }

    // ── Trends ─────────────────────────────────────────────────

    pub fn calculate_trends(&self) -> GapResult<Option<Trends>> {
        self.daily.validate()?;
        Ok(trend::calculate(&self.daily))
    }

    // ── Consistency ────────────────────────────────────────────

    pub fn decomposition_check(&self) -> Vec<DecompositionMismatch> {
        consistency::decomposition_mismatches(&self.gaps, self.config.consistency_tolerance)
    }

    pub fn ticket_decomposition(&self) -> Vec<TicketDecomposition> {
        consistency::ticket_decomposition(&self.gaps)
    }

    pub fn consistency_report(&self) -> ConsistencyReport {
        let report = consistency::report(&self.daily, &self.gaps);
        for warning in &report.warnings {
            log::warn!("{warning}");
        }
        report
    }

    // ── Distribution ───────────────────────────────────────────

    pub fn field_summaries(&self) -> GapResult<Vec<FieldSummary>> {
        self.validate_gaps()?;
        Ok(distribution::field_summaries(&self.gaps))
    }

    pub fn correlations(&self) -> GapResult<CorrelationMatrix> {
        self.validate_gaps()?;
        Ok(distribution::correlations(&self.gaps))
    }

    // ── Filtering & summary ────────────────────────────────────

    /// A new engine over the rows matching `filter`. Daily rows are kept
    /// for surviving stores only.
    pub fn filtered(&self, filter: &GapFilter) -> GapEngine {
        let index = self.daily.region_index();
        let gaps: Vec<StoreGap> = self
            .gaps
            .iter()
            .filter(|g| filter.matches(g, &index))
            .cloned()
            .collect();
        let keep: BTreeSet<&str> = gaps.iter().map(|g| g.store_name.as_str()).collect();
        let rows = self
            .daily
            .rows
            .iter()
            .filter(|r| keep.contains(r.store_name.as_str()))
            .cloned()
            .collect();
        let daily = DailyTable::new(self.daily.columns, rows);
        GapEngine::from_parts(daily, gaps, self.config.clone())
    }

    pub fn summary(&self) -> TableSummary {
        let mut stores: BTreeSet<&str> = self.gaps.iter().map(|g| g.store_name.as_str()).collect();
        stores.extend(self.daily.rows.iter().map(|r| r.store_name.as_str()));
        let groups: BTreeSet<&str> = self.gaps.iter().map(|g| g.group.as_str()).collect();

        let index = self.daily.region_index();
        let mut regions: BTreeSet<RegionId> = index.values().copied().collect();
        regions.extend(self.gaps.iter().filter_map(|g| g.region_id));

        let dates: Vec<NaiveDate> = self.daily.rows.iter().filter_map(|r| r.sale_date).collect();
        let date_span = dates
            .iter()
            .min()
            .zip(dates.iter().max())
            .map(|(a, b)| (*a, *b));

        TableSummary {
            daily_rows: self.daily.rows.len(),
            gap_rows: self.gaps.len(),
            stores: stores.len(),
            groups: groups.len(),
            regions: regions.len(),
            date_span,
        }
    }

    fn validate_gaps(&self) -> GapResult<()> {
        self.gaps.iter().try_for_each(StoreGap::validate)
    }
}

/// Engine over the given tables with default configuration.
impl From<&TableSet> for GapEngine {
    fn from(tables: &TableSet) -> Self {
        GapEngine::new(tables, GapConfig::default())
    }
}
