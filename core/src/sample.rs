//! Sample datasets: the fixed demo tables and a seeded synthetic generator.

use crate::{
    config::GapConfig,
    rng::{SampleRng, StreamSlot},
    stats::round2,
    tables::{table_set, DailyTable, StoreGap, StoreRecord, TableSet},
    types::RegionId,
};
use chrono::{Days, NaiveDate};

const DEMO_GROUPS: [&str; 5] = ["1-0", "1-0", "2-0", "2-0", "3-0"];
const DEMO_GAP_RL: [f64; 5] = [-5000.0, -3000.0, -1000.0, 2000.0, 4000.0];
const DEMO_GAP_CUPOM: [f64; 5] = [-50.0, -30.0, -10.0, 20.0, 40.0];
const DEMO_GAP_BM: [f64; 5] = [-100.0, -60.0, -20.0, 40.0, 80.0];
const DEMO_GAP_PM: [f64; 5] = [-10.0, -6.0, -2.0, 4.0, 8.0];
const DEMO_GAP_PROD: [f64; 5] = [-5.0, -3.0, -1.0, 2.0, 4.0];

/// Regions cycled over by the synthetic generator.
const SYNTHETIC_REGIONS: RegionId = 4;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}

pub fn store_name(i: usize) -> String {
    format!("Loja {i:03}")
}

/// The 20-store demonstration dataset: one daily row per store, five-store
/// gap pattern repeated four times across groups `1-0`, `2-0`, `3-0`.
pub fn demo_tables(config: &GapConfig) -> TableSet {
    let mut rows = Vec::with_capacity(20);
    let mut gaps = Vec::with_capacity(20);
    for i in 0..20usize {
        let name = store_name(i + 1);
        rows.push(StoreRecord {
            store_name: name.clone(),
            franchise_code: Some((i + 1).to_string()),
            region_id: Some((i / 5 + 1) as RegionId),
            sale_date: base_date().checked_add_days(Days::new(i as u64)),
            net_revenue: 10_000.0 + i as f64 * 1_000.0,
            coupon_count: 100 + i as i64 * 10,
            item_count: 200 + i as i64 * 20,
            weekly_median_revenue: 15_000.0,
            weekly_median_coupons: 150.0,
        });
        let k = i % 5;
        gaps.push(StoreGap {
            store_name: name,
            group: DEMO_GROUPS[k].to_string(),
            region_id: None,
            gap_revenue: DEMO_GAP_RL[k],
            gap_coupon: DEMO_GAP_CUPOM[k],
            gap_ticket: DEMO_GAP_BM[k],
            gap_price: DEMO_GAP_PM[k],
            gap_productivity: DEMO_GAP_PROD[k],
        });
    }
    table_set(config, DailyTable::from_rows(rows), gaps)
}

/// Seeded synthetic dataset: `stores` stores over `days` consecutive days.
///
/// Component gaps are drawn independently and the revenue gap is their
/// sum, except for roughly one store in ten which carries a residual so
/// the decomposition check has something to find.
pub fn synthetic_tables(seed: u64, stores: usize, days: usize, config: &GapConfig) -> TableSet {
    let mut store_rng = SampleRng::new(seed, StreamSlot::Stores);
    let mut daily_rng = SampleRng::new(seed, StreamSlot::Daily);
    let mut gap_rng = SampleRng::new(seed, StreamSlot::Gaps);

    let group_count = (stores / 5).max(1) as u64;
    let mut rows = Vec::with_capacity(stores * days);
    let mut gaps = Vec::with_capacity(stores);

    for i in 0..stores {
        let name = store_name(i + 1);
        let group = format!("{}-0", store_rng.next_u64_below(group_count) + 1);
        let region = (i as RegionId % SYNTHETIC_REGIONS) + 1;
        let base_revenue = store_rng.uniform(8_000.0, 40_000.0);
        let base_ticket = store_rng.uniform(40.0, 120.0);

        for d in 0..days {
            let revenue = (base_revenue * (1.0 + daily_rng.normal(0.0, 0.12))).max(0.0);
            let coupons = (revenue / base_ticket).round() as i64;
            let items = (coupons as f64 * daily_rng.uniform(1.2, 2.5)).round() as i64;
            rows.push(StoreRecord {
                store_name: name.clone(),
                franchise_code: Some(format!("F{:04}", i + 1)),
                region_id: Some(region),
                sale_date: base_date().checked_add_days(Days::new(d as u64)),
                net_revenue: round2(revenue),
                coupon_count: coupons,
                item_count: items,
                weekly_median_revenue: round2(base_revenue),
                weekly_median_coupons: (base_revenue / base_ticket).round(),
            });
        }

        let gap_coupon = round2(gap_rng.normal(0.0, 2_500.0));
        let gap_ticket = round2(gap_rng.normal(0.0, 1_500.0));
        let gap_price = round2(gap_rng.normal(0.0, 600.0));
        let gap_productivity = round2(gap_rng.normal(0.0, 300.0));
        let residual = if gap_rng.chance(0.1) {
            round2(gap_rng.normal(0.0, 400.0))
        } else {
            0.0
        };
        gaps.push(StoreGap {
            store_name: name,
            group,
            region_id: None,
            gap_revenue: round2(
                gap_coupon + gap_ticket + gap_price + gap_productivity + residual,
            ),
            gap_coupon,
            gap_ticket,
            gap_price,
            gap_productivity,
        });
    }

    log::debug!(
        "Synthetic dataset: seed {seed}, {} daily rows, {} gap rows",
        rows.len(),
        gaps.len()
    );
    table_set(config, DailyTable::from_rows(rows), gaps)
}
