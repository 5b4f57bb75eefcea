use super::TableStore;
use crate::{
    error::GapResult,
    tables::{parse_sale_date, DailyColumns, DailyTable, StoreRecord},
};
use rusqlite::{params, Connection, OptionalExtension};

pub(super) fn declare_columns(conn: &Connection, columns: DailyColumns) -> GapResult<()> {
    conn.execute(
        "INSERT INTO daily_columns (id, region, sale_date) VALUES (1, ?1, ?2)
         ON CONFLICT(id) DO UPDATE SET region = excluded.region, sale_date = excluded.sale_date",
        params![columns.region, columns.sale_date],
    )?;
    Ok(())
}

pub(super) fn insert(conn: &Connection, r: &StoreRecord) -> GapResult<()> {
    conn.execute(
        "INSERT INTO daily_sales (
            store_name, franchise_code, region_id, sale_date, net_revenue,
            coupon_count, item_count, weekly_median_revenue, weekly_median_coupons
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            r.store_name,
            r.franchise_code,
            r.region_id,
            r.sale_date.map(|d| d.format("%Y-%m-%d").to_string()),
            r.net_revenue,
            r.coupon_count,
            r.item_count,
            r.weekly_median_revenue,
            r.weekly_median_coupons,
        ],
    )?;
    Ok(())
}

impl TableStore {
    // ── Daily sales ────────────────────────────────────────────

    pub fn insert_store_record(&self, record: &StoreRecord) -> GapResult<()> {
        insert(&self.conn, record)
    }

    /// Record which optional columns the source declares.
    pub fn declare_daily_columns(&self, columns: DailyColumns) -> GapResult<()> {
        declare_columns(&self.conn, columns)
    }

    /// All daily rows in insertion order. A column is present when it was
    /// declared or when any row carries a value for it.
    pub fn load_daily(&self) -> GapResult<DailyTable> {
        let mut stmt = self.conn.prepare(
            "SELECT store_name, franchise_code, region_id, sale_date, net_revenue,
                    coupon_count, item_count, weekly_median_revenue, weekly_median_coupons
             FROM daily_sales ORDER BY id ASC",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    StoreRecord {
                        store_name: row.get(0)?,
                        franchise_code: row.get(1)?,
                        region_id: row.get(2)?,
                        sale_date: None,
                        net_revenue: row.get(4)?,
                        coupon_count: row.get(5)?,
                        item_count: row.get(6)?,
                        weekly_median_revenue: row.get(7)?,
                        weekly_median_coupons: row.get(8)?,
                    },
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let rows = raw
            .into_iter()
            .map(|(mut record, date)| {
                record.sale_date = date.as_deref().map(parse_sale_date).transpose()?;
                Ok(record)
            })
            .collect::<GapResult<Vec<_>>>()?;

        let mut table = DailyTable::from_rows(rows);
        if let Some(declared) = self.declared_columns()? {
            table.columns.region |= declared.region;
            table.columns.sale_date |= declared.sale_date;
        }
        Ok(table)
    }

    fn declared_columns(&self) -> GapResult<Option<DailyColumns>> {
        let declared = self
            .conn
            .query_row(
                "SELECT region, sale_date FROM daily_columns WHERE id = 1",
                [],
                |row| {
                    Ok(DailyColumns {
                        region: row.get(0)?,
                        sale_date: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(declared)
    }

    pub fn daily_row_count(&self) -> GapResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM daily_sales", [], |row| row.get(0))?;
        Ok(n)
    }
}
