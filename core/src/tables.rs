//! Input tables handed to the engine by the ingestion layer.
//!
//! Tables are immutable once loaded. The engine takes its own copy at
//! construction and never writes back.

use crate::{
    config::GapConfig,
    error::{GapError, GapResult},
    types::{GroupId, RegionId, StoreName},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Daily ────────────────────────────────────────────────────────────────────

/// One row of the daily table: one store on one sale date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreRecord {
    pub store_name: StoreName,
    pub franchise_code: Option<String>,
    pub region_id: Option<RegionId>,
    pub sale_date: Option<NaiveDate>,
    pub net_revenue: f64,
    pub coupon_count: i64,
    pub item_count: i64,
    pub weekly_median_revenue: f64,
    pub weekly_median_coupons: f64,
}

/// Which optional columns the daily table carries.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyColumns {
    pub region: bool,
    pub sale_date: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailyTable {
    pub columns: DailyColumns,
    pub rows: Vec<StoreRecord>,
}

impl DailyTable {
    pub fn new(columns: DailyColumns, rows: Vec<StoreRecord>) -> Self {
        Self { columns, rows }
    }

    /// Infer column presence from the rows: a column is present when at
    /// least one row carries a value for it.
    pub fn from_rows(rows: Vec<StoreRecord>) -> Self {
        let columns = DailyColumns {
            region: rows.iter().any(|r| r.region_id.is_some()),
            sale_date: rows.iter().any(|r| r.sale_date.is_some()),
        };
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows_for<'a>(&'a self, store: &'a str) -> impl Iterator<Item = &'a StoreRecord> + 'a {
        self.rows.iter().filter(move |r| r.store_name == store)
    }

    /// First region seen for each store. Empty when the table has no
    /// region column.
    pub fn region_index(&self) -> HashMap<&str, RegionId> {
        let mut index = HashMap::new();
        if !self.columns.region {
            return index;
        }
        for row in &self.rows {
            if let Some(region) = row.region_id {
                index.entry(row.store_name.as_str()).or_insert(region);
            }
        }
        index
    }

    pub(crate) fn validate(&self) -> GapResult<()> {
        for row in &self.rows {
            let checks = [
                ("net_revenue", row.net_revenue),
                ("weekly_median_revenue", row.weekly_median_revenue),
                ("weekly_median_coupons", row.weekly_median_coupons),
            ];
            if let Some((field, _)) = checks.iter().find(|(_, v)| !v.is_finite()) {
                return Err(GapError::NonFiniteDaily {
                    store: row.store_name.clone(),
                    field: *field,
                });
            }
        }
        Ok(())
    }
}

// ── Cluster gaps ─────────────────────────────────────────────────────────────

/// One row of the cluster gap table: a store's gap against the benchmark
/// of its comparison group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreGap {
    pub store_name: StoreName,
    pub group: GroupId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<RegionId>,
    /// LacunaRL: net revenue gap (currency).
    pub gap_revenue: f64,
    /// LacunaCupom: coupon count gap.
    pub gap_coupon: f64,
    /// LacunaBM: average ticket gap (currency).
    pub gap_ticket: f64,
    /// LacunaPM: average price gap (currency).
    pub gap_price: f64,
    /// LacunaProd: productivity gap (ratio).
    pub gap_productivity: f64,
}

impl StoreGap {
    pub fn value(&self, field: GapField) -> f64 {
        match field {
            GapField::Revenue => self.gap_revenue,
            GapField::Coupon => self.gap_coupon,
            GapField::Ticket => self.gap_ticket,
            GapField::Price => self.gap_price,
            GapField::Productivity => self.gap_productivity,
        }
    }

    /// Coupon + Ticket + Price + Productivity.
    pub fn component_sum(&self) -> f64 {
        self.gap_coupon + self.gap_ticket + self.gap_price + self.gap_productivity
    }

    pub(crate) fn validate(&self) -> GapResult<()> {
        match GapField::ALL.iter().find(|f| !self.value(**f).is_finite()) {
            Some(field) => Err(GapError::NonFiniteGap {
                store: self.store_name.clone(),
                field: field.column(),
            }),
            None => Ok(()),
        }
    }
}

/// The five gap figures, in waterfall order after Revenue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GapField {
    Revenue,
    Coupon,
    Ticket,
    Price,
    Productivity,
}

impl GapField {
    pub const ALL: [GapField; 5] = [
        GapField::Revenue,
        GapField::Coupon,
        GapField::Ticket,
        GapField::Price,
        GapField::Productivity,
    ];

    /// Source column name.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Revenue => "LacunaRL",
            Self::Coupon => "LacunaCupom",
            Self::Ticket => "LacunaBM",
            Self::Price => "LacunaPM",
            Self::Productivity => "LacunaProd",
        }
    }
}

// ── Table set ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    Daily(DailyTable),
    ClusterGaps(Vec<StoreGap>),
}

/// Table name to table, as produced by ingestion.
pub type TableSet = HashMap<String, Table>;

/// Build a table set under the configured names.
pub fn table_set(config: &GapConfig, daily: DailyTable, gaps: Vec<StoreGap>) -> TableSet {
    let mut tables = TableSet::new();
    tables.insert(config.daily_table.clone(), Table::Daily(daily));
    tables.insert(config.cluster_table.clone(), Table::ClusterGaps(gaps));
    tables
}

pub(crate) fn take_daily(tables: &TableSet, name: &str) -> DailyTable {
    match tables.get(name) {
        Some(Table::Daily(t)) => t.clone(),
        Some(Table::ClusterGaps(_)) => {
            log::warn!("Table '{name}' holds cluster gaps, expected daily rows; ignoring");
            DailyTable::default()
        }
        None => {
            log::warn!("Table '{name}' not found; daily data is empty");
            DailyTable::default()
        }
    }
}

pub(crate) fn take_gaps(tables: &TableSet, name: &str) -> Vec<StoreGap> {
    match tables.get(name) {
        Some(Table::ClusterGaps(rows)) => rows.clone(),
        Some(Table::Daily(_)) => {
            log::warn!("Table '{name}' holds daily rows, expected cluster gaps; ignoring");
            Vec::new()
        }
        None => {
            log::warn!("Table '{name}' not found; cluster gaps are empty");
            Vec::new()
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` sale date.
pub fn parse_sale_date(value: &str) -> GapResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| GapError::InvalidDate {
        value: value.to_string(),
    })
}
