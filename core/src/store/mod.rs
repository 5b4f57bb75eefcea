//! SQLite table source.
//!
//! RULE: Only the store talks to the database. The engine never sees a
//! connection; it receives plain tables from `load_tables()`.

mod cluster_gaps;
mod daily;

use crate::{
    config::GapConfig,
    error::GapResult,
    tables::{table_set, Table, TableSet},
};
use rusqlite::{Connection, OpenFlags};

pub struct TableStore {
    conn: Connection,
}

impl TableStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> GapResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GapResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GapResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_input_tables.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_daily_columns.sql"))?;
        Ok(())
    }

    /// Both tables, keyed by the configured table names.
    pub fn load_tables(&self, config: &GapConfig) -> GapResult<TableSet> {
        let daily = self.load_daily()?;
        let gaps = self.load_cluster_gaps()?;
        log::info!(
            "Loaded {} daily rows and {} gap rows from SQLite",
            daily.rows.len(),
            gaps.len()
        );
        Ok(table_set(config, daily, gaps))
    }

    /// Write a whole table set in one transaction, replacing what is there.
    pub fn replace_tables(&mut self, tables: &TableSet, config: &GapConfig) -> GapResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM daily_sales; DELETE FROM cluster_gap; DELETE FROM daily_columns;",
        )?;
        if let Some(Table::Daily(daily)) = tables.get(&config.daily_table) {
            daily::declare_columns(&tx, daily.columns)?;
            for row in &daily.rows {
                daily::insert(&tx, row)?;
            }
        }
        if let Some(Table::ClusterGaps(gaps)) = tables.get(&config.cluster_table) {
            for gap in gaps {
                cluster_gaps::insert(&tx, gap)?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
