//! Day-by-day totals across all stores with period-over-period change.

use crate::tables::DailyTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub net_revenue: f64,
    pub coupon_count: i64,
    pub item_count: i64,
    /// Percent change against the previous date. `None` on the first date
    /// and whenever the previous value is zero.
    pub revenue_change_pct: Option<f64>,
    pub coupon_change_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trends {
    pub series: Vec<TrendPoint>,
    pub latest_date: NaiveDate,
    pub date_range: (NaiveDate, NaiveDate),
}

/// `None` when the table is empty, has no sale-date column, or no row
/// carries a date.
pub fn calculate(daily: &DailyTable) -> Option<Trends> {
    if daily.is_empty() || !daily.columns.sale_date {
        return None;
    }

    let mut by_date: BTreeMap<NaiveDate, (f64, i64, i64)> = BTreeMap::new();
    for row in &daily.rows {
        let Some(date) = row.sale_date else { continue };
        let entry = by_date.entry(date).or_insert((0.0, 0, 0));
        entry.0 += row.net_revenue;
        entry.1 = entry.1.saturating_add(row.coupon_count);
        entry.2 = entry.2.saturating_add(row.item_count);
    }

    let first = *by_date.keys().next()?;
    let last = *by_date.keys().next_back()?;

    let mut series: Vec<TrendPoint> = Vec::with_capacity(by_date.len());
    for (date, (revenue, coupons, items)) in by_date {
        let (revenue_change_pct, coupon_change_pct) = match series.last() {
            Some(p) => (
                pct_change(p.net_revenue, revenue),
                pct_change(p.coupon_count as f64, coupons as f64),
            ),
            None => (None, None),
        };
        series.push(TrendPoint {
            date,
            net_revenue: revenue,
            coupon_count: coupons,
            item_count: items,
            revenue_change_pct,
            coupon_change_pct,
        });
    }

    Some(Trends {
        series,
        latest_date: last,
        date_range: (first, last),
    })
}

fn pct_change(prev: f64, current: f64) -> Option<f64> {
    if prev == 0.0 {
        return None;
    }
    Some((current - prev) / prev * 100.0)
}
