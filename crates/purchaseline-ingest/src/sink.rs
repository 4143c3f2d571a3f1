//! DuckDB-backed purchase sink

use std::path::Path;

use anyhow::{Context, Result};
use duckdb::{Connection, params};
use purchaseline_core::{BatchView, PurchaseSink, SchemaError, SinkError, normalize_date};

use crate::schema;

/// Appends batches to the `purchases` table, one transaction per batch.
pub struct DuckDbSink {
    conn: Connection,
    date_formats: Vec<String>,
}

impl std::fmt::Debug for DuckDbSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbSink")
            .field("date_formats", &self.date_formats)
            .finish_non_exhaustive()
    }
}

impl DuckDbSink {
    /// Open (or create) a database file, creating its parent directory.
    pub fn open(path: &Path, date_formats: Vec<String>) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database dir: {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open DuckDB database: {}", path.display()))?;
        log::debug!("Opened {}", path.display());
        Ok(Self { conn, date_formats })
    }

    pub fn open_in_memory(date_formats: Vec<String>) -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open DuckDB in-memory connection")?;
        Ok(Self { conn, date_formats })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Rows currently stored in `purchases`.
    pub fn row_count(&self) -> Result<u64, SinkError> {
        let count: i64 = self
            .conn
            .query_row(schema::count_purchases(), [], |row| row.get(0))
            .map_err(classify)?;
        Ok(count as u64)
    }
}

impl PurchaseSink for DuckDbSink {
    fn create_schema(&mut self) -> Result<(), SchemaError> {
        schema::ensure_schema(&self.conn)
    }

    fn append_rows(&mut self, batch: &BatchView<'_>) -> Result<(), SinkError> {
        // Resolve every date up front so a bad one never opens a transaction
        let first_row = batch.range().start;
        let dates = batch
            .rows()
            .enumerate()
            .map(|(i, row)| {
                normalize_date(row.date, &self.date_formats)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .ok_or_else(|| SinkError::InvalidDate {
                        row: first_row + i,
                        value: row.date.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Dropping the transaction without commit rolls the batch back
        let tx = self.conn.transaction().map_err(classify)?;
        {
            let mut stmt = tx.prepare(schema::insert_purchase()).map_err(classify)?;
            for (row, date) in batch.rows().zip(&dates) {
                stmt.execute(params![row.user_id, date.as_str(), row.price])
                    .map_err(classify)?;
            }
        }
        tx.commit().map_err(classify)
    }
}

/// Map a DuckDB error onto the sink taxonomy by its error class prefix.
fn classify(err: duckdb::Error) -> SinkError {
    let msg = err.to_string();
    if msg.contains("Constraint Error") {
        SinkError::Constraint(msg)
    } else if msg.contains("Conversion Error")
        || msg.contains("Out of Range Error")
        || msg.contains("out of range")
    {
        SinkError::InvalidValue(msg)
    } else {
        SinkError::Storage(msg)
    }
}
