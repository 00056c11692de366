//! SQL for the two report tables.
//!
//! Statements are generated from [`ReportTable::columns`] so that the DDL,
//! the inserts and the selects always agree on column names and order.

use rusqlite::Connection;
use tracing::info;

use crate::session::ReportTable;
use crate::StoreResult;

fn column_list(table: ReportTable) -> String {
    table.columns().iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
}

/// `CREATE TABLE` and key index for `table`.  Key columns are `NOT NULL`;
/// data columns are nullable reals.
pub fn create_table_sql(table: ReportTable) -> String {
    let columns = table
        .columns()
        .iter()
        .map(|c| {
            if c.is_integer() {
                format!("    {:<13} INTEGER NOT NULL", c.name())
            } else {
                format!("    {:<13} REAL", c.name())
            }
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!(
        "CREATE TABLE IF NOT EXISTS {t} (\n{columns}\n);\n\
         CREATE INDEX IF NOT EXISTS {t}_key ON {t} (network_id, app_run_id, ts);",
        t = table.name(),
    )
}

/// Rows of one network/run in `[?3, ?4]`, in decode order.
pub fn select_sql(table: ReportTable) -> String {
    let order = match table {
        ReportTable::Standard => "ts, link_id, qty_type",
        ReportTable::Debug    => "ts, ctm_id, link_id, qty_type",
    };
    format!(
        "SELECT {cols} FROM {t} \
         WHERE network_id = ?1 AND app_run_id = ?2 AND ts BETWEEN ?3 AND ?4 \
         ORDER BY {order}",
        cols = column_list(table),
        t = table.name(),
    )
}

pub fn timestamps_sql(table: ReportTable) -> String {
    format!(
        "SELECT DISTINCT ts FROM {t} \
         WHERE network_id = ?1 AND app_run_id = ?2 AND ts BETWEEN ?3 AND ?4 \
         ORDER BY ts",
        t = table.name(),
    )
}

pub fn insert_sql(table: ReportTable) -> String {
    let placeholders = (1..=table.columns().len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {t} ({cols}) VALUES ({placeholders})",
        t = table.name(),
        cols = column_list(table),
    )
}

pub fn delete_sql(table: ReportTable) -> String {
    format!(
        "DELETE FROM {t} WHERE network_id = ?1 AND app_run_id = ?2 AND ts BETWEEN ?3 AND ?4",
        t = table.name(),
    )
}

/// Create both report tables if they do not exist yet.
pub fn init_schema(conn: &Connection) -> StoreResult<()> {
    for table in [ReportTable::Standard, ReportTable::Debug] {
        conn.execute_batch(&create_table_sql(table))?;
    }
    info!(tables = ?[ReportTable::Standard.name(), ReportTable::Debug.name()], "report schema ready");
    Ok(())
}
