//! Waterfall decomposition of a revenue gap.
//!
//! Six steps: Base (absolute 0), the four component gaps as signed deltas,
//! and Total (absolute, the stored revenue gap). The Total bar is the
//! stored `gap_revenue` even when the components do not add up to it;
//! `residual()` exposes the difference.

use crate::tables::StoreGap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Drawn from zero.
    Absolute,
    /// Drawn as a delta off the running cumulative value.
    Relative,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WaterfallStep {
    pub label: &'static str,
    pub kind: StepKind,
    pub value: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Waterfall {
    /// `None` for the company-wide decomposition.
    pub store_name: Option<String>,
    pub steps: Vec<WaterfallStep>,
}

pub const STEP_LABELS: [&str; 6] = [
    "Base",
    "Lacuna Cupom",
    "Lacuna BM",
    "Lacuna PM",
    "Lacuna Prod",
    "Total",
];

impl Waterfall {
    /// Decompose one store's row. `None` when the store is not in the table.
    pub fn for_store(gaps: &[StoreGap], store: &str) -> Option<Self> {
        let row = gaps.iter().find(|g| g.store_name == store)?;
        Some(Self::build(Some(store.to_string()), Totals::of_row(row)))
    }

    /// Decompose the sum over every row. `None` for an empty table.
    pub fn aggregate(gaps: &[StoreGap]) -> Option<Self> {
        if gaps.is_empty() {
            return None;
        }
        let totals = gaps.iter().fold(Totals::default(), |acc, g| acc + Totals::of_row(g));
        Some(Self::build(None, totals))
    }

    fn build(store_name: Option<String>, t: Totals) -> Self {
        let deltas = [t.coupon, t.ticket, t.price, t.productivity];
        let mut steps = Vec::with_capacity(STEP_LABELS.len());
        steps.push(WaterfallStep {
            label: STEP_LABELS[0],
            kind: StepKind::Absolute,
            value: 0.0,
            cumulative: 0.0,
        });
        let mut running = 0.0;
        for (label, delta) in STEP_LABELS[1..5].iter().zip(deltas) {
            running += delta;
            steps.push(WaterfallStep {
                label: *label,
                kind: StepKind::Relative,
                value: delta,
                cumulative: running,
            });
        }
        steps.push(WaterfallStep {
            label: STEP_LABELS[5],
            kind: StepKind::Absolute,
            value: t.revenue,
            cumulative: t.revenue,
        });
        Self { store_name, steps }
    }

    pub fn categories(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.label).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.value).collect()
    }

    pub fn cumulative(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.cumulative).collect()
    }

    /// The stored revenue gap (Total bar).
    pub fn total(&self) -> f64 {
        self.steps.last().map(|s| s.value).unwrap_or(0.0)
    }

    /// Running sum after the last component step.
    pub fn component_sum(&self) -> f64 {
        self.steps
            .iter()
            .filter(|s| s.kind == StepKind::Relative)
            .map(|s| s.value)
            .sum()
    }

    /// `total - component_sum`. Zero when the decomposition is additive.
    pub fn residual(&self) -> f64 {
        self.total() - self.component_sum()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    revenue: f64,
    coupon: f64,
    ticket: f64,
    price: f64,
    productivity: f64,
}

impl Totals {
    fn of_row(g: &StoreGap) -> Self {
        Self {
            revenue: g.gap_revenue,
            coupon: g.gap_coupon,
            ticket: g.gap_ticket,
            price: g.gap_price,
            productivity: g.gap_productivity,
        }
    }
}

impl std::ops::Add for Totals {
    type Output = Self;

    fn add(self, o: Self) -> Self {
        Self {
            revenue: self.revenue + o.revenue,
            coupon: self.coupon + o.coupon,
            ticket: self.ticket + o.ticket,
            price: self.price + o.price,
            productivity: self.productivity + o.productivity,
        }
    }
}
