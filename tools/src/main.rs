//! pulse-runner: headless runner for the Pulso gap dashboard.
//!
//! Usage:
//!   pulse-runner --sample
//!   pulse-runner --daily-csv diaria.csv --gaps-csv cluster.csv --json
//!   pulse-runner --seed 7 --stores 60 --days 30 --store "Loja 004"
//!   pulse-runner --db pulso.db --ipc-mode

mod csv_source;

use anyhow::Result;
use pulse_core::{
    config::GapConfig,
    engine::GapEngine,
    metrics::{MetricsBag, MetricsReport},
    sample,
    store::TableStore,
    tables::{table_set, TableSet},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Metrics,
    Waterfall {
        #[serde(default)]
        store: Option<String>,
    },
    StoreDetails {
        store: String,
    },
    Trends,
    Summary,
    Consistency,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let stores = parse_arg(&args, "--stores", 40usize);
    let days = parse_arg(&args, "--days", 30usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let json = args.iter().any(|a| a == "--json");
    let use_sample = args.iter().any(|a| a == "--sample");
    let db = flag_value(&args, "--db");
    let daily_csv = flag_value(&args, "--daily-csv");
    let gaps_csv = flag_value(&args, "--gaps-csv");
    let store = flag_value(&args, "--store");

    let config = match flag_value(&args, "--config") {
        Some(path) => GapConfig::load(path)?,
        None => GapConfig::default(),
    };

    let source = if daily_csv.is_some() || gaps_csv.is_some() {
        "csv"
    } else if use_sample {
        "sample"
    } else if db.is_some() {
        "db"
    } else {
        "synthetic"
    };

    if !ipc_mode && !json {
        println!("Pulso gap analysis: pulse-runner");
        println!("  started:   {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
        println!("  source:    {source}");
        match source {
            "synthetic" => {
                println!("  seed:      {seed}");
                println!("  stores:    {stores}");
                println!("  days:      {days}");
            }
            "db" => println!("  db:        {}", db.unwrap_or_default()),
            _ => {}
        }
        println!();
    }

    let tables = match source {
        "csv" => {
            let daily = match daily_csv {
                Some(path) => csv_source::read_daily(path)?,
                None => Default::default(),
            };
            let gaps = match gaps_csv {
                Some(path) => csv_source::read_gaps(path)?,
                None => Vec::new(),
            };
            table_set(&config, daily, gaps)
        }
        "sample" => sample::demo_tables(&config),
        "db" => open_store(db.unwrap_or(":memory:"))?.load_tables(&config)?,
        _ => sample::synthetic_tables(seed, stores, days, &config),
    };

    // Any non-database source is written through when --db is also given.
    if source != "db" {
        if let Some(path) = db {
            persist(path, &tables, &config)?;
        }
    }

    let engine = GapEngine::new(&tables, config);

    if ipc_mode {
        run_ipc_loop(&engine)?;
    } else if let Some(name) = store {
        print_store(&engine, name, json)?;
    } else if json {
        let report = MetricsReport::from(engine.calculate_all_metrics());
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&engine)?;
    }

    Ok(())
}

fn open_store(path: &str) -> Result<TableStore> {
    let store = TableStore::open(path)?;
    store.migrate()?;
    Ok(store)
}

fn persist(path: &str, tables: &TableSet, config: &GapConfig) -> Result<()> {
    let mut store = open_store(path)?;
    store.replace_tables(tables, config)?;
    log::info!(
        "Wrote {} daily rows and {} gap rows to {path}",
        store.daily_row_count()?,
        store.gap_row_count()?
    );
    Ok(())
}

fn run_ipc_loop(engine: &GapEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e)?;
                continue;
            }
        };

        let response = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Metrics => {
                serde_json::to_value(MetricsReport::from(engine.calculate_all_metrics()))
            }
            IpcCommand::Waterfall { store } => match engine.waterfall(store.as_deref()) {
                Ok(w) => serde_json::to_value(w),
                Err(e) => Ok(serde_json::json!({ "error": e.to_string() })),
            },
            IpcCommand::StoreDetails { store } => match engine.store_details(&store) {
                Ok(d) => serde_json::to_value(d),
                Err(e) => Ok(serde_json::json!({ "error": e.to_string() })),
            },
            IpcCommand::Trends => match engine.calculate_trends() {
                Ok(t) => serde_json::to_value(t),
                Err(e) => Ok(serde_json::json!({ "error": e.to_string() })),
            },
            IpcCommand::Summary => serde_json::to_value(engine.summary()),
            IpcCommand::Consistency => serde_json::to_value(engine.consistency_report()),
        };

        match response {
            Ok(value) => writeln!(stdout, "{value}")?,
            Err(e) => write_error(&mut stdout, &e)?,
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(out: &mut impl Write, e: &dyn std::fmt::Display) -> Result<()> {
    let err_json = serde_json::json!({ "error": e.to_string() });
    writeln!(out, "{err_json}")?;
    out.flush()?;
    Ok(())
}

fn print_summary(engine: &GapEngine) -> Result<()> {
    let shape = engine.summary();
    println!("=== DATASET ===");
    println!("  daily rows:     {}", shape.daily_rows);
    println!("  gap rows:       {}", shape.gap_rows);
    println!("  stores:         {}", shape.stores);
    println!("  groups:         {}", shape.groups);
    println!("  regions:        {}", shape.regions);
    if let Some((first, last)) = shape.date_span {
        println!("  dates:          {first} .. {last}");
    }
    println!();

    let metrics = match engine.calculate_all_metrics() {
        Ok(m) => m,
        Err(e) => {
            println!("=== METRICS UNAVAILABLE ===");
            println!("  {e}");
            return Ok(());
        }
    };
    print_metrics(&metrics);

    let report = engine.consistency_report();
    if !report.is_clean() {
        println!();
        println!("=== CONSISTENCY ===");
        for warning in &report.warnings {
            println!("  {warning}");
        }
    }
    let mismatches = engine.decomposition_check();
    if !mismatches.is_empty() {
        println!("  {} stores where components do not add up to LacunaRL", mismatches.len());
    }
    Ok(())
}

fn print_metrics(m: &MetricsBag) {
    println!("=== GAP SUMMARY ===");
    println!("  total gap RL:     {:.2}", m.total_gap_revenue);
    println!("  total gap cupom:  {:.2}", m.total_gap_coupon);
    println!("  total gap BM:     {:.2}", m.total_gap_ticket);
    println!("  capture target:   {:.1}%", m.capture_percentage);
    println!("  stores:           {}", m.store_count);
    println!("  with gap:         {}", m.stores_with_gap);
    println!("  above target:     {}", m.stores_above_target);

    println!();
    println!("=== TOP OPPORTUNITIES ===");
    if m.top_opportunities.is_empty() {
        println!("  (none)");
    }
    for r in &m.top_opportunities {
        println!("  {:>3}. {:<24} {:>12.2}  [{}]", r.rank, r.store_name, r.gap_revenue, r.group);
    }

    println!();
    println!("=== TOP PERFORMERS ===");
    if m.top_performers.is_empty() {
        println!("  (none)");
    }
    for r in &m.top_performers {
        println!("  {:>3}. {:<24} {:>12.2}  [{}]", r.rank, r.store_name, r.gap_revenue, r.group);
    }

    println!();
    println!("=== BY CLUSTER ===");
    for c in &m.cluster_rollup {
        println!(
            "  {:<8} | Stores: {:>3} | Gap RL: {:>12.2} | Potential: {:>12.2}",
            c.key, c.store_count, c.revenue.sum, c.revenue_potential
        );
    }

    if let Some(regions) = &m.region_rollup {
        println!();
        println!("=== BY REGION ===");
        for r in regions {
            println!(
                "  GR {:<5} | Stores: {:>3} | Gap RL: {:>12.2} | Potential: {:>12.2}",
                r.key, r.store_count, r.revenue.sum, r.revenue_potential
            );
        }
    }
}

fn print_store(engine: &GapEngine, name: &str, json: bool) -> Result<()> {
    let detail = engine.store_details(name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!("=== STORE: {} ===", detail.store_name);
    let Some(gap) = &detail.cluster_data else {
        println!("  (no gap row for this store)");
        return Ok(());
    };
    println!("  group:          {}", gap.group);
    println!("  gap RL:         {:.2}", gap.gap_revenue);
    if let Some(c) = &detail.cluster_comparison {
        println!(
            "  rank in group:  {} of {} (median {:.2}, mean {:.2})",
            c.rank_in_cluster, c.cluster_size, c.cluster_median_rl, c.cluster_mean_rl
        );
    }
    if let Some(insight) = &detail.insight {
        println!("  insight:        {insight:?}");
    }
    if let Some(days) = &detail.daily_data {
        println!("  daily rows:     {}", days.len());
    }

    if let Some(w) = engine.waterfall(Some(name))? {
        println!();
        println!("=== WATERFALL ===");
        for step in &w.steps {
            println!("  {:<14} {:>12.2}  (cum {:>12.2})", step.label, step.value, step.cumulative);
        }
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
