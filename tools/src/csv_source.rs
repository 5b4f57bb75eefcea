//! CSV exports of the two dashboard sheets.
//!
//! Headers keep the spreadsheet column names. Optional columns may be
//! missing from the header entirely or left empty per row.

use anyhow::{Context, Result};
use pulse_core::tables::{parse_sale_date, DailyColumns, DailyTable, StoreGap, StoreRecord};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct DailyRow {
    #[serde(rename = "NomeLoja")]
    store_name: String,
    #[serde(rename = "codigo_franquia", default)]
    franchise_code: Option<String>,
    #[serde(rename = "NumeroGR", default)]
    region_id: Option<i64>,
    #[serde(rename = "datavenda", default)]
    sale_date: Option<String>,
    #[serde(rename = "receita_liquida", default)]
    net_revenue: f64,
    #[serde(rename = "qtd_cupom", default)]
    coupon_count: i64,
    #[serde(rename = "qtd_item", default)]
    item_count: i64,
    #[serde(rename = "Mediana_Semana_RL", default)]
    weekly_median_revenue: f64,
    #[serde(rename = "Mediana_Semana_cupom", default)]
    weekly_median_coupons: f64,
}

#[derive(Debug, Deserialize)]
struct GapRow {
    #[serde(rename = "NomeLoja")]
    store_name: String,
    #[serde(rename = "grupo_comparavel")]
    group: String,
    #[serde(rename = "NumeroGR", default)]
    region_id: Option<i64>,
    #[serde(rename = "LacunaRL")]
    gap_revenue: f64,
    #[serde(rename = "LacunaCupom")]
    gap_coupon: f64,
    #[serde(rename = "LacunaBM")]
    gap_ticket: f64,
    #[serde(rename = "LacunaPM")]
    gap_price: f64,
    #[serde(rename = "LacunaProd")]
    gap_productivity: f64,
}

pub fn read_daily(path: &str) -> Result<DailyTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Cannot open {path}"))?;

    // Optional columns count as present when the header declares them,
    // even if every cell is blank.
    let headers = reader
        .headers()
        .with_context(|| format!("{path}: cannot read header"))?;
    let columns = DailyColumns {
        region: headers.iter().any(|h| h == "NumeroGR"),
        sale_date: headers.iter().any(|h| h == "datavenda"),
    };

    let mut rows = Vec::new();
    for (i, result) in reader.deserialize::<DailyRow>().enumerate() {
        let row = result.with_context(|| format!("{path}: bad record {}", i + 1))?;
        let sale_date = row
            .sale_date
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(parse_sale_date)
            .transpose()?;
        rows.push(StoreRecord {
            store_name: row.store_name,
            franchise_code: row.franchise_code,
            region_id: row.region_id,
            sale_date,
            net_revenue: row.net_revenue,
            coupon_count: row.coupon_count,
            item_count: row.item_count,
            weekly_median_revenue: row.weekly_median_revenue,
            weekly_median_coupons: row.weekly_median_coupons,
        });
    }
    log::info!("Read {} daily rows from {path}", rows.len());
    Ok(DailyTable::new(columns, rows))
}

pub fn read_gaps(path: &str) -> Result<Vec<StoreGap>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Cannot open {path}"))?;

    let mut gaps = Vec::new();
    for (i, result) in reader.deserialize::<GapRow>().enumerate() {
        let row = result.with_context(|| format!("{path}: bad record {}", i + 1))?;
        gaps.push(StoreGap {
            store_name: row.store_name,
            group: row.group,
            region_id: row.region_id,
            gap_revenue: row.gap_revenue,
            gap_coupon: row.gap_coupon,
            gap_ticket: row.gap_ticket,
            gap_price: row.gap_price,
            gap_productivity: row.gap_productivity,
        });
    }
    log::info!("Read {} gap rows from {path}", gaps.len());
    Ok(gaps)
}
