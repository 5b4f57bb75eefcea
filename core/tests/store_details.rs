//! Per-store drill-down.

use chrono::NaiveDate;
use pulse_core::{
    config::GapConfig,
    engine::GapEngine,
    store_detail::{GapDriver, Insight},
    tables::{DailyTable, StoreGap, StoreRecord},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn gap(store: &str, group: &str, rl: f64, cupom: f64, bm: f64) -> StoreGap {
    StoreGap {
        store_name: store.to_string(),
        group: group.to_string(),
        region_id: None,
        gap_revenue: rl,
        gap_coupon: cupom,
        gap_ticket: bm,
        gap_price: 0.0,
        gap_productivity: 0.0,
    }
}

fn record(store: &str, day: u32) -> StoreRecord {
    StoreRecord {
        store_name: store.to_string(),
        franchise_code: None,
        region_id: Some(1),
        sale_date: NaiveDate::from_ymd_opt(2025, 3, day),
        net_revenue: 500.0,
        coupon_count: 5,
        item_count: 9,
        weekly_median_revenue: 480.0,
        weekly_median_coupons: 5.0,
    }
}

/// Group "G" holds five stores with revenue gaps -50, -10, 0, 10, 20;
/// group "H" holds one.
fn make_engine() -> GapEngine {
    let gaps = vec![
        gap("S1", "G", -50.0, -40.0, -5.0),
        gap("S2", "G", -10.0, -1.0, -8.0),
        gap("S3", "G", 0.0, 0.0, 0.0),
        gap("S4", "G", 10.0, 5.0, 5.0),
        gap("S5", "G", 20.0, 10.0, 10.0),
        gap("Solo", "H", -20_000.0, -3.0, -9.0),
    ];
    let daily = DailyTable::from_rows(vec![record("S2", 1), record("S2", 2), record("S4", 1)]);
    GapEngine::from_parts(daily, gaps, GapConfig::default())
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Cluster statistics and strict rank for the second-worst store.
#[test]
fn cluster_comparison_for_member() {
    let detail = make_engine().store_details("S2").unwrap();
    assert_eq!(detail.cluster_data.as_ref().map(|g| g.group.as_str()), Some("G"));

    let c = detail.cluster_comparison.expect("comparison present");
    assert_eq!(c.cluster_size, 5);
    assert_eq!(c.cluster_median_rl, 0.0);
    assert_eq!(c.cluster_mean_rl, -6.0);
    assert!(c.cluster_std_rl.is_some());
    assert_eq!(c.rank_in_cluster, 2);

    let days = detail.daily_data.expect("daily rows present");
    assert_eq!(days.len(), 2);
}

/// Tied gaps share the same rank.
#[test]
fn tied_gaps_share_rank() {
    let gaps = vec![
        gap("A", "G", -10.0, 0.0, 0.0),
        gap("B", "G", -10.0, 0.0, 0.0),
        gap("C", "G", 5.0, 0.0, 0.0),
    ];
    let engine = GapEngine::from_parts(DailyTable::default(), gaps, GapConfig::default());
    let a = engine.store_details("A").unwrap().cluster_comparison.unwrap();
    let b = engine.store_details("B").unwrap().cluster_comparison.unwrap();
    let c = engine.store_details("C").unwrap().cluster_comparison.unwrap();
    assert_eq!(a.rank_in_cluster, 1);
    assert_eq!(b.rank_in_cluster, 1);
    assert_eq!(c.rank_in_cluster, 3);
}

/// The ranking context orders best to worst and shows nearby stores.
#[test]
fn ranking_context_lists_neighbours() {
    let detail = make_engine().store_details("S2").unwrap();
    let ctx = detail.ranking_context.expect("context present");
    assert_eq!(ctx.group_size, 5);
    assert_eq!(ctx.position, 4, "S2 is fourth from the top");
    assert!((ctx.percentile - 20.0).abs() < 1e-9);
    let names: Vec<&str> = ctx.neighbours.iter().map(|n| n.store_name.as_str()).collect();
    assert_eq!(names, ["S5", "S4", "S3", "S2", "S1"]);
    assert_eq!(ctx.neighbours[0].position, 1);
}

/// A one-store group has no standard deviation but still ranks.
#[test]
fn single_store_group() {
    let detail = make_engine().store_details("Solo").unwrap();
    let c = detail.cluster_comparison.unwrap();
    assert_eq!(c.cluster_size, 1);
    assert_eq!(c.rank_in_cluster, 1);
    assert!(c.cluster_std_rl.is_none());
    assert!(detail.daily_data.is_none(), "no daily rows for Solo");
}

/// Unknown stores carry the name and nothing else.
#[test]
fn unknown_store_is_empty_detail() {
    let detail = make_engine().store_details("Nowhere").unwrap();
    assert_eq!(detail.store_name, "Nowhere");
    assert!(detail.cluster_data.is_none());
    assert!(detail.daily_data.is_none());
    assert!(detail.cluster_comparison.is_none());
    assert!(detail.insight.is_none());

    let json = serde_json::to_value(&detail).unwrap();
    assert_eq!(json.as_object().map(|o| o.len()), Some(1), "only store_name is emitted");
}

/// Insights flag large shortfalls with their main driver.
#[test]
fn insight_classification() {
    let engine = make_engine();
    let solo = engine.store_details("Solo").unwrap();
    assert_eq!(
        solo.insight,
        Some(Insight::HighOpportunity {
            driver: GapDriver::Ticket
        })
    );
    assert_eq!(engine.store_details("S4").unwrap().insight, Some(Insight::Balanced));

    let big = gap("Big", "G", 15_000.0, 0.0, 0.0);
    assert_eq!(Insight::classify(&big, 10_000.0), Insight::AboveBenchmark);
    let coupons = gap("C", "G", -15_000.0, -900.0, -10.0);
    assert_eq!(
        Insight::classify(&coupons, 10_000.0),
        Insight::HighOpportunity {
            driver: GapDriver::Coupon
        }
    );
}
