//! Data consistency checks.
//!
//! Nothing here alters the tables. Mismatches are reported so the caller
//! can decide whether the source data is trustworthy.

use crate::tables::{DailyTable, StoreGap};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A row whose components do not add up to its revenue gap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecompositionMismatch {
    pub store_name: String,
    pub gap_revenue: f64,
    pub component_sum: f64,
    /// `gap_revenue - component_sum`.
    pub residual: f64,
}

/// Average ticket gap against its price and productivity parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketDecomposition {
    pub store_name: String,
    pub gap_ticket: f64,
    pub price_plus_productivity: f64,
    pub difference: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConsistencyReport {
    pub warnings: Vec<String>,
    pub stores_missing_from_gaps: usize,
    pub stores_missing_from_daily: usize,
    pub duplicate_gap_stores: Vec<String>,
}

impl ConsistencyReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub fn decomposition_mismatches(gaps: &[StoreGap], tolerance: f64) -> Vec<DecompositionMismatch> {
    gaps.iter()
        .filter_map(|g| {
            let component_sum = g.component_sum();
            let residual = g.gap_revenue - component_sum;
            (residual.abs() > tolerance).then(|| DecompositionMismatch {
                store_name: g.store_name.clone(),
                gap_revenue: g.gap_revenue,
                component_sum,
                residual,
            })
        })
        .collect()
}

pub fn ticket_decomposition(gaps: &[StoreGap]) -> Vec<TicketDecomposition> {
    gaps.iter()
        .map(|g| {
            let parts = g.gap_price + g.gap_productivity;
            TicketDecomposition {
                store_name: g.store_name.clone(),
                gap_ticket: g.gap_ticket,
                price_plus_productivity: parts,
                difference: g.gap_ticket - parts,
            }
        })
        .collect()
}

/// Cross-table checks. Daily-only and gap-only stores are counted only
/// when both tables hold rows.
pub fn report(daily: &DailyTable, gaps: &[StoreGap]) -> ConsistencyReport {
    let mut report = ConsistencyReport::default();

    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();
    for g in gaps {
        if !seen.insert(g.store_name.as_str()) {
            duplicates.insert(g.store_name.clone());
        }
    }
    if !duplicates.is_empty() {
        report.warnings.push(format!(
            "Duplicate store names in cluster gaps: {}",
            duplicates.len()
        ));
        report.duplicate_gap_stores = duplicates.into_iter().collect();
    }

    if daily.is_empty() || gaps.is_empty() {
        return report;
    }

    let daily_stores: HashSet<&str> = daily.rows.iter().map(|r| r.store_name.as_str()).collect();
    report.stores_missing_from_gaps = daily_stores.difference(&seen).count();
    report.stores_missing_from_daily = seen.difference(&daily_stores).count();

    if report.stores_missing_from_gaps > 0 {
        report.warnings.push(format!(
            "Stores in daily data but not in cluster gaps: {}",
            report.stores_missing_from_gaps
        ));
    }
    if report.stores_missing_from_daily > 0 {
        report.warnings.push(format!(
            "Stores in cluster gaps but not in daily data: {}",
            report.stores_missing_from_daily
        ));
    }
    report
}
