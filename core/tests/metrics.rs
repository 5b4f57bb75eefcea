//! Integration tests for the dashboard metrics bag.
//!
//! Tests verify:
//! 1. Totals and counters over a small hand-built gap table
//! 2. Empty tables yield a zeroed bag, not an error
//! 3. A non-finite gap fails the whole computation with an error report
//! 4. The region rollup appears only when daily data carries regions
//! 5. Capture percentage comes from configuration

use pulse_core::{
    config::GapConfig,
    engine::GapEngine,
    metrics::MetricsReport,
    tables::{table_set, DailyTable, StoreGap, StoreRecord},
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

fn record(store: &str, region: Option<i64>) -> StoreRecord {
    StoreRecord {
        store_name: store.to_string(),
        franchise_code: None,
        region_id: region,
        sale_date: None,
        net_revenue: 1_000.0,
        coupon_count: 10,
        item_count: 20,
        weekly_median_revenue: 1_000.0,
        weekly_median_coupons: 10.0,
    }
}

fn make_engine(daily: Vec<StoreRecord>, gaps: Vec<StoreGap>) -> GapEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = GapConfig::default();
    let tables = table_set(&config, DailyTable::from_rows(daily), gaps);
    GapEngine::new(&tables, config)
}

fn two_store_engine() -> GapEngine {
    make_engine(
        vec![record("A", Some(1)), record("B", Some(1))],
        vec![gap("A", "G1", -5000.0, -50.0, -20.0), gap("B", "G1", 2000.0, 20.0, 10.0)],
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Two stores in one group: totals, counters and the single opportunity.
#[test]
fn totals_and_counters_over_two_stores() {
    let bag = two_store_engine().calculate_all_metrics().unwrap();

    assert_eq!(bag.total_gap_revenue, -3000.0, "revenue total");
    assert_eq!(bag.total_gap_coupon, -30.0, "coupon total");
    assert_eq!(bag.total_gap_ticket, -10.0, "ticket total");
    assert_eq!(bag.store_count, 2);
    assert_eq!(bag.stores_with_gap, 1);
    assert_eq!(bag.stores_above_target, 1);

    assert_eq!(bag.top_opportunities.len(), 1);
    assert_eq!(bag.top_opportunities[0].store_name, "A");
    assert_eq!(bag.top_opportunities[0].gap_revenue_abs, Some(5000.0));
    assert_eq!(bag.top_performers.len(), 1);
    assert_eq!(bag.top_performers[0].store_name, "B");

    assert_eq!(bag.cluster_rollup.len(), 1);
    let g1 = &bag.cluster_rollup[0];
    assert_eq!(g1.key, "G1");
    assert_eq!(g1.store_count, 2);
    assert_eq!(g1.revenue.sum, -3000.0);
    assert_eq!(g1.revenue_potential, 3000.0, "potential is the negated shortfall");
}

/// Stores with a zero revenue gap count toward neither counter.
#[test]
fn zero_gap_is_neither_shortfall_nor_surplus() {
    let engine = make_engine(Vec::new(), vec![gap("Z", "G1", 0.0, 0.0, 0.0)]);
    let bag = engine.calculate_all_metrics().unwrap();
    assert_eq!(bag.store_count, 1);
    assert_eq!(bag.stores_with_gap, 0);
    assert_eq!(bag.stores_above_target, 0);
    assert!(bag.top_opportunities.is_empty());
    assert!(bag.top_performers.is_empty());
}

/// No data at all is a valid state with an all-zero bag.
#[test]
fn empty_tables_give_zeroed_bag() {
    let bag = make_engine(Vec::new(), Vec::new())
        .calculate_all_metrics()
        .expect("empty tables must not error");
    assert_eq!(bag.total_gap_revenue, 0.0);
    assert_eq!(bag.store_count, 0);
    assert!(bag.cluster_rollup.is_empty());
    assert!(bag.region_rollup.is_none(), "no daily regions, no region rollup");

    let json = serde_json::to_value(MetricsReport::Ok(bag)).unwrap();
    assert!(json.get("error").is_none());
    assert_eq!(json["total_lojas"], 0);
}

/// Missing tables degrade to empty instead of failing construction.
#[test]
fn missing_tables_degrade_to_empty() {
    let engine = GapEngine::new(&Default::default(), GapConfig::default());
    let bag = engine.calculate_all_metrics().unwrap();
    assert_eq!(bag.store_count, 0);
}

/// A NaN anywhere in the gap table fails the computation and the wire
/// form carries an `error` key.
#[test]
fn non_finite_gap_reports_error() {
    let engine = make_engine(
        Vec::new(),
        vec![gap("A", "G1", -10.0, 0.0, 0.0), gap("B", "G1", f64::NAN, 0.0, 0.0)],
    );
    let result = engine.calculate_all_metrics();
    assert!(result.is_err(), "NaN revenue gap must fail");

    let json = serde_json::to_value(MetricsReport::from(result)).unwrap();
    let message = json["error"].as_str().expect("error key present");
    assert!(message.contains("LacunaRL"), "message names the column: {message}");
    assert!(message.contains('B'), "message names the store: {message}");
}

/// The region rollup joins stores to regions through the daily table.
#[test]
fn region_rollup_present_with_region_column() {
    let engine = make_engine(
        vec![record("A", Some(1)), record("B", Some(2)), record("C", Some(2))],
        vec![
            gap("A", "G1", -100.0, 0.0, 0.0),
            gap("B", "G1", -200.0, 0.0, 0.0),
            gap("C", "G2", 50.0, 0.0, 0.0),
        ],
    );
    let bag = engine.calculate_all_metrics().unwrap();
    let regions = bag.region_rollup.expect("region rollup should be present");
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].key, 1);
    assert_eq!(regions[0].store_count, 1);
    assert_eq!(regions[1].key, 2);
    assert_eq!(regions[1].revenue.sum, -150.0);
    assert_eq!(regions[1].revenue_potential, 150.0);
}

/// Without any region values the `analise_gr` key is omitted entirely.
#[test]
fn region_rollup_absent_without_region_column() {
    let engine = make_engine(
        vec![record("A", None)],
        vec![gap("A", "G1", -100.0, 0.0, 0.0)],
    );
    let bag = engine.calculate_all_metrics().unwrap();
    assert!(bag.region_rollup.is_none());
    let json = serde_json::to_value(&bag).unwrap();
    assert!(json.get("analise_gr").is_none(), "key must be omitted");
    assert!(json.get("analise_clusters").is_some());
}

/// Capture percentage is a configured policy value.
#[test]
fn capture_percentage_comes_from_config() {
    let config = GapConfig {
        capture_percentage: 25.0,
        ..GapConfig::default()
    };
    let tables = table_set(&config, DailyTable::default(), vec![gap("A", "G1", -1.0, 0.0, 0.0)]);
    let bag = GapEngine::new(&tables, config).calculate_all_metrics().unwrap();
    assert_eq!(bag.capture_percentage, 25.0);

    let default_bag = two_store_engine().calculate_all_metrics().unwrap();
    assert_eq!(default_bag.capture_percentage, 40.0);
}

/// Dashboard key names are kept on the wire.
#[test]
fn bag_serialises_with_dashboard_keys() {
    let json = serde_json::to_value(two_store_engine().calculate_all_metrics().unwrap()).unwrap();
    for key in [
        "lacuna_total_rl",
        "lacuna_total_cupom",
        "lacuna_total_bm",
        "percentual_captura",
        "total_lojas",
        "lojas_com_lacuna",
        "lojas_acima_meta",
        "top_oportunidades",
        "top_destaques",
        "analise_clusters",
        "analise_gr",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(json["analise_clusters"][0]["LacunaRL_Potencial"], 3000.0);
    assert_eq!(json["analise_clusters"][0]["Qtd_Lojas"], 2);
}

/// Rollup rows are flat, keyed by the dashboard's column names.
#[test]
fn rollup_rows_use_dashboard_columns() {
    let json = serde_json::to_value(two_store_engine().calculate_all_metrics().unwrap()).unwrap();

    let g1 = &json["analise_clusters"][0];
    assert_eq!(g1["grupo_comparavel"], "G1");
    assert_eq!(g1["Qtd_Lojas"], 2);
    assert_eq!(g1["LacunaRL_Total"], -3000.0, "group revenue total");
    assert_eq!(g1["LacunaRL_Media"], -1500.0);
    assert!(g1["LacunaRL_Desvio"].as_f64().is_some(), "two stores have a std");
    assert_eq!(g1["LacunaRL_Potencial"], 3000.0);
    assert_eq!(g1["sum_LacunaCupom"], -30.0);
    assert_eq!(g1["mean_LacunaBM"], -5.0);
    for key in ["sum_LacunaPM", "mean_LacunaPM", "sum_LacunaProd", "mean_LacunaProd"] {
        assert!(g1.get(key).is_some(), "missing rollup column {key}");
    }
    assert!(g1.get("key").is_none(), "no generic key field");
    assert!(g1.get("LacunaRL").is_none(), "no nested aggregate");

    let gr = &json["analise_gr"][0];
    assert_eq!(gr["NumeroGR"], 1);
    assert_eq!(gr["LacunaRL_Total"], -3000.0);
    assert!(gr.get("grupo_comparavel").is_none());
}

/// A single-store group emits a null deviation.
#[test]
fn single_store_group_has_null_deviation() {
    let engine = make_engine(Vec::new(), vec![gap("A", "G1", -10.0, 0.0, 0.0)]);
    let json = serde_json::to_value(engine.calculate_all_metrics().unwrap()).unwrap();
    assert!(json["analise_clusters"][0]["LacunaRL_Desvio"].is_null());
}

/// The engine can be shared across threads.
#[test]
fn engine_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GapEngine>();

    let engine = std::sync::Arc::new(two_store_engine());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            std::thread::spawn(move || engine.calculate_all_metrics().unwrap().total_gap_revenue)
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), -3000.0);
    }
}
