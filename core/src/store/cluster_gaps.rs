use super::TableStore;
use crate::{error::GapResult, tables::StoreGap};
use rusqlite::{params, Connection};

pub(super) fn insert(conn: &Connection, g: &StoreGap) -> GapResult<()> {
    conn.execute(
        "INSERT INTO cluster_gap (
            store_name, grupo_comparavel, region_id, gap_revenue,
            gap_coupon, gap_ticket, gap_price, gap_productivity
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            g.store_name,
            g.group,
            g.region_id,
            g.gap_revenue,
            g.gap_coupon,
            g.gap_ticket,
            g.gap_price,
            g.gap_productivity,
        ],
    )?;
    Ok(())
}

impl TableStore {
    // ── Cluster gaps ───────────────────────────────────────────

    pub fn insert_store_gap(&self, gap: &StoreGap) -> GapResult<()> {
        insert(&self.conn, gap)
    }

    /// All gap rows in insertion order, so ranking ties break the same way
    /// the source sheet lists them.
    pub fn load_cluster_gaps(&self) -> GapResult<Vec<StoreGap>> {
        let mut stmt = self.conn.prepare(
            "SELECT store_name, grupo_comparavel, region_id, gap_revenue,
                    gap_coupon, gap_ticket, gap_price, gap_productivity
             FROM cluster_gap ORDER BY id ASC",
        )?;
        let gaps = stmt
            .query_map([], |row| {
                Ok(StoreGap {
                    store_name: row.get(0)?,
                    group: row.get(1)?,
                    region_id: row.get(2)?,
                    gap_revenue: row.get(3)?,
                    gap_coupon: row.get(4)?,
                    gap_ticket: row.get(5)?,
                    gap_price: row.get(6)?,
                    gap_productivity: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(gaps)
    }

    pub fn gap_row_count(&self) -> GapResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM cluster_gap", [], |row| row.get(0))?;
        Ok(n)
    }
}
