//! Waterfall decomposition of the revenue gap.

use pulse_core::{
    config::GapConfig,
    engine::GapEngine,
    tables::{DailyTable, StoreGap},
    waterfall::{StepKind, Waterfall, STEP_LABELS},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn gap(store: &str, rl: f64, parts: [f64; 4]) -> StoreGap {
    StoreGap {
        store_name: store.to_string(),
        group: "1-0".to_string(),
        region_id: None,
        gap_revenue: rl,
        gap_coupon: parts[0],
        gap_ticket: parts[1],
        gap_price: parts[2],
        gap_productivity: parts[3],
    }
}

fn make_engine(gaps: Vec<StoreGap>) -> GapEngine {
    GapEngine::from_parts(DailyTable::default(), gaps, GapConfig::default())
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Running totals accumulate component by component and end on the total.
#[test]
fn single_store_cumulative_sequence() {
    let gaps = vec![gap("A", 100.0, [20.0, 30.0, 20.0, 30.0])];
    let w = Waterfall::for_store(&gaps, "A").expect("store exists");

    assert_eq!(w.store_name.as_deref(), Some("A"));
    assert_eq!(w.categories(), STEP_LABELS.to_vec());
    assert_eq!(w.values(), [0.0, 20.0, 30.0, 20.0, 30.0, 100.0]);
    assert_eq!(w.cumulative(), [0.0, 20.0, 50.0, 70.0, 100.0, 100.0]);
    assert_eq!(w.total(), 100.0);
    assert_eq!(w.residual(), 0.0);

    let kinds: Vec<StepKind> = w.steps.iter().map(|s| s.kind).collect();
    assert_eq!(kinds[0], StepKind::Absolute);
    assert!(kinds[1..5].iter().all(|k| *k == StepKind::Relative));
    assert_eq!(kinds[5], StepKind::Absolute);
}

/// Total is the stored revenue gap even when components disagree.
#[test]
fn total_is_stored_gap_and_residual_exposed() {
    let gaps = vec![gap("A", -90.0, [-50.0, -30.0, -10.0, -5.0])];
    let w = Waterfall::for_store(&gaps, "A").unwrap();
    assert_eq!(w.total(), -90.0);
    assert_eq!(w.component_sum(), -95.0);
    assert_eq!(w.residual(), 5.0);
}

/// Without a store name the waterfall decomposes the whole table.
#[test]
fn aggregate_sums_every_row() {
    let engine = make_engine(vec![
        gap("A", 100.0, [20.0, 30.0, 20.0, 30.0]),
        gap("B", -40.0, [-10.0, -10.0, -10.0, -10.0]),
    ]);
    let w = engine.waterfall(None).unwrap().expect("non-empty table");
    assert!(w.store_name.is_none());
    assert_eq!(w.values(), [0.0, 10.0, 20.0, 10.0, 20.0, 60.0]);
    assert_eq!(w.cumulative()[4], 60.0);
}

/// Unknown stores and empty tables give no waterfall.
#[test]
fn unknown_store_or_empty_table_gives_none() {
    let engine = make_engine(vec![gap("A", 1.0, [1.0, 0.0, 0.0, 0.0])]);
    assert!(engine.waterfall(Some("Nobody")).unwrap().is_none());
    assert!(make_engine(Vec::new()).waterfall(None).unwrap().is_none());
}

/// Steps serialise with their display labels.
#[test]
fn steps_serialise_with_labels() {
    let engine = make_engine(vec![gap("A", 1.0, [1.0, 0.0, 0.0, 0.0])]);
    let w = engine.waterfall(Some("A")).unwrap().unwrap();
    let json = serde_json::to_value(&w).unwrap();
    assert_eq!(json["steps"][1]["label"], "Lacuna Cupom");
    assert_eq!(json["steps"][5]["kind"], "absolute");
}
