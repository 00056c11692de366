//! SQLite storage session.
//!
//! Opens (or creates) the database, initialises both report tables and
//! implements [`StorageSession`] on top of `rusqlite`.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Rows};

use ctm_core::Timestamp;
use ctm_report::{Column, CursorError, DecodeResult, ReportRow, Row, RowCursor};

use crate::schema::{delete_sql, init_schema, insert_sql, select_sql, timestamps_sql};
use crate::session::{ReportFilter, ReportTable, StorageSession};
use crate::{StoreConfig, StoreResult};

// ── SqliteSession ─────────────────────────────────────────────────────────────

/// A [`StorageSession`] backed by one SQLite connection.
pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    /// Open the database named by `config` and initialise the schema.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let conn = Connection::open(&config.db_path)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        if config.wal {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous  = NORMAL;",
            )?;
        }
        Self::from_connection(conn)
    }

    /// Open `path` with default settings.
    pub fn open_path(path: &Path) -> StoreResult<Self> {
        Self::open(&StoreConfig::new(path))
    }

    /// A private in-memory database, mainly for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, creating the report tables if needed.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn filter_params(filter: &ReportFilter) -> [i64; 4] {
    [
        filter.network_id.0,
        filter.run_id.0,
        filter.interval.start.0,
        filter.interval.end.0,
    ]
}

/// Bind values of `row` in `table` column order.
fn row_values(table: ReportTable, row: &ReportRow) -> Vec<Value> {
    table
        .columns()
        .iter()
        .map(|&c| {
            if c.is_integer() {
                row.integer(c).map_or(Value::Null, Value::Integer)
            } else {
                row.real(c).map_or(Value::Null, Value::Real)
            }
        })
        .collect()
}

impl StorageSession for SqliteSession {
    fn query_rows<T>(
        &self,
        table:   ReportTable,
        filter:  &ReportFilter,
        consume: impl FnOnce(&mut dyn RowCursor) -> DecodeResult<T>,
    ) -> StoreResult<T> {
        let mut stmt = self.conn.prepare_cached(&select_sql(table))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();
        let rows = stmt.query(params_from_iter(filter_params(filter)))?;
        let mut cursor = SqliteCursor::new(columns, rows);
        Ok(consume(&mut cursor)?)
    }

    fn query_timestamps(&self, table: ReportTable, filter: &ReportFilter) -> StoreResult<Vec<Timestamp>> {
        let mut stmt = self.conn.prepare_cached(&timestamps_sql(table))?;
        let times = stmt
            .query_map(params_from_iter(filter_params(filter)), |r| r.get::<_, i64>(0))?
            .map(|t| t.map(Timestamp))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(times)
    }

    fn insert_rows(&self, table: ReportTable, rows: &[ReportRow]) -> StoreResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let mut stmt = self.conn.prepare_cached(&insert_sql(table))?;
        let mut inserted = 0;
        for row in rows {
            inserted += stmt.execute(params_from_iter(row_values(table, row)))?;
        }
        Ok(inserted)
    }

    fn delete_rows(&self, table: ReportTable, filter: &ReportFilter) -> StoreResult<usize> {
        let [network, run, start, end] = filter_params(filter);
        let deleted = self
            .conn
            .prepare_cached(&delete_sql(table))?
            .execute(params![network, run, start, end])?;
        Ok(deleted)
    }

    fn in_transaction<T>(&self, body: impl FnOnce(&Self) -> StoreResult<T>) -> StoreResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let out = body(self)?;
        tx.commit()?;
        Ok(out)
    }
}

// ── SqliteCursor ──────────────────────────────────────────────────────────────

/// Copy of the scalar fields of the current result row.
struct BufferedRow {
    positions: HashMap<Column, usize>,
    values:    Vec<Value>,
}

impl BufferedRow {
    fn value(&self, column: Column) -> Result<&Value, CursorError> {
        self.positions
            .get(&column)
            .and_then(|&i| self.values.get(i))
            .ok_or_else(|| CursorError::new(format!("column {column} is not in the result set")))
    }
}

impl Row for BufferedRow {
    fn get_i64(&self, column: Column) -> Result<Option<i64>, CursorError> {
        match self.value(column)? {
            Value::Null       => Ok(None),
            Value::Integer(v) => Ok(Some(*v)),
            _                 => Err(CursorError::type_mismatch(column, "integer")),
        }
    }

    fn get_f64(&self, column: Column) -> Result<Option<f64>, CursorError> {
        match self.value(column)? {
            Value::Null       => Ok(None),
            Value::Integer(v) => Ok(Some(*v as f64)),
            Value::Real(v)    => Ok(Some(*v)),
            _                 => Err(CursorError::type_mismatch(column, "real")),
        }
    }
}

/// Forward-only [`RowCursor`] over a `rusqlite` result set.
pub struct SqliteCursor<'stmt> {
    rows:    Rows<'stmt>,
    columns: Vec<String>,
    current: BufferedRow,
}

impl<'stmt> SqliteCursor<'stmt> {
    /// `columns` are the statement's result column names, in order.
    pub fn new(columns: Vec<String>, rows: Rows<'stmt>) -> Self {
        let positions = columns
            .iter()
            .enumerate()
            .filter_map(|(i, name)| Column::from_name(name).map(|c| (c, i)))
            .collect();
        let current = BufferedRow { positions, values: Vec::with_capacity(columns.len()) };
        Self { rows, columns, current }
    }
}

fn cursor_error(e: rusqlite::Error) -> CursorError {
    CursorError::new(e.to_string())
}

impl RowCursor for SqliteCursor<'_> {
    fn column_names(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn next_row(&mut self) -> Result<Option<&dyn Row>, CursorError> {
        let Some(row) = self.rows.next().map_err(cursor_error)? else {
            return Ok(None);
        };
        self.current.values.clear();
        for i in 0..self.columns.len() {
            self.current.values.push(row.get::<_, Value>(i).map_err(cursor_error)?);
        }
        Ok(Some(&self.current as &dyn Row))
    }
}
