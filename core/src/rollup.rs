//! Comparison-group and regional rollups.
//!
//! Groups are never stored. Every rollup is a query over the flat gap
//! table, so it cannot drift from its source rows.

use crate::{
    stats::{self, round2},
    tables::{GapField, StoreGap},
    types::{GroupId, RegionId},
};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Sum, mean and sample standard deviation of one gap field in a group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FieldAggregate {
    pub sum: f64,
    pub mean: f64,
    /// Absent for groups of one store.
    pub std: Option<f64>,
}

impl FieldAggregate {
    fn of(values: &[f64]) -> Self {
        Self {
            sum: round2(stats::sum(values)),
            mean: round2(stats::mean(values)),
            std: stats::sample_std(values).map(round2),
        }
    }
}

/// One rollup row. Serialises flat, with the dashboard's column names:
/// `LacunaRL_Total`/`_Media`/`_Desvio`/`_Potencial` for revenue and
/// `sum_`/`mean_` prefixes for the other four fields.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRollup<K> {
    pub key: K,
    pub store_count: usize,
    pub revenue: FieldAggregate,
    pub coupon: FieldAggregate,
    pub ticket: FieldAggregate,
    pub price: FieldAggregate,
    pub productivity: FieldAggregate,
    /// Recoverable revenue: `-revenue.sum` when negative, else zero.
    pub revenue_potential: f64,
}

/// Column a rollup key is emitted under.
pub trait RollupKey {
    const COLUMN: &'static str;
}

impl RollupKey for GroupId {
    const COLUMN: &'static str = "grupo_comparavel";
}

impl RollupKey for RegionId {
    const COLUMN: &'static str = "NumeroGR";
}

impl<K: RollupKey + Serialize> Serialize for GroupRollup<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(K::COLUMN, &self.key)?;
        map.serialize_entry("Qtd_Lojas", &self.store_count)?;
        map.serialize_entry("LacunaRL_Total", &self.revenue.sum)?;
        map.serialize_entry("LacunaRL_Media", &self.revenue.mean)?;
        map.serialize_entry("LacunaRL_Desvio", &self.revenue.std)?;
        map.serialize_entry("LacunaRL_Potencial", &self.revenue_potential)?;
        for field in &GapField::ALL[1..] {
            let agg = self.field(*field);
            map.serialize_entry(&format!("sum_{}", field.column()), &agg.sum)?;
            map.serialize_entry(&format!("mean_{}", field.column()), &agg.mean)?;
        }
        map.end()
    }
}

impl<K> GroupRollup<K> {
    pub fn field(&self, field: GapField) -> &FieldAggregate {
        match field {
            GapField::Revenue => &self.revenue,
            GapField::Coupon => &self.coupon,
            GapField::Ticket => &self.ticket,
            GapField::Price => &self.price,
            GapField::Productivity => &self.productivity,
        }
    }

    fn from_members(key: K, members: &[&StoreGap]) -> Self {
        let column = |f: GapField| -> Vec<f64> { members.iter().map(|g| g.value(f)).collect() };
        let revenue = FieldAggregate::of(&column(GapField::Revenue));
        Self {
            key,
            store_count: members.len(),
            revenue_potential: if revenue.sum < 0.0 {
                -revenue.sum
            } else {
                0.0
            },
            revenue,
            coupon: FieldAggregate::of(&column(GapField::Coupon)),
            ticket: FieldAggregate::of(&column(GapField::Ticket)),
            price: FieldAggregate::of(&column(GapField::Price)),
            productivity: FieldAggregate::of(&column(GapField::Productivity)),
        }
    }
}

/// Group rows by `key_of` and aggregate each group, in ascending key
/// order. Rows for which `key_of` yields `None` are left out.
pub fn rollup_by<K, F>(gaps: &[StoreGap], mut key_of: F) -> Vec<GroupRollup<K>>
where
    K: Ord + Clone,
    F: FnMut(&StoreGap) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<&StoreGap>> = BTreeMap::new();
    for gap in gaps {
        if let Some(key) = key_of(gap) {
            groups.entry(key).or_default().push(gap);
        }
    }
    groups
        .into_iter()
        .map(|(key, members)| GroupRollup::from_members(key, &members))
        .collect()
}

pub fn by_cluster(gaps: &[StoreGap]) -> Vec<GroupRollup<GroupId>> {
    rollup_by(gaps, |g| Some(g.group.clone()))
}

// ── Comparison group view ────────────────────────────────────────────────────

/// All gap rows sharing one comparison group, borrowed from the table.
#[derive(Debug, Clone)]
pub struct ComparisonGroup<'a> {
    pub id: &'a str,
    pub members: Vec<&'a StoreGap>,
}

impl<'a> ComparisonGroup<'a> {
    pub fn of(gaps: &'a [StoreGap], id: &'a str) -> Self {
        Self {
            id,
            members: gaps.iter().filter(|g| g.group == id).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn revenue_gaps(&self) -> Vec<f64> {
        self.members.iter().map(|g| g.gap_revenue).collect()
    }

    /// Peers with a strictly smaller revenue gap, plus one. Tied stores
    /// share a rank and no rank is skipped-to-fill.
    pub fn rank_of(&self, gap_revenue: f64) -> usize {
        self.members.iter().filter(|g| g.gap_revenue < gap_revenue).count() + 1
    }
}
