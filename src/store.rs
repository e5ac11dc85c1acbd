//! SQLite-backed `users` table.
//!
//! [`UserStore::insert_records`] is the batch persister: one transaction per
//! file, one multi-row `INSERT` per batch, commit only after the last batch.
//! Any failure, including a record that does not map, rolls back every batch
//! written so far in the run.

use std::path::Path;

use itertools::Itertools;
use log::{debug, info, warn};
use rusqlite::{Connection, ToSql, Transaction, params_from_iter};
use serde::Serialize;

use crate::{
    error::{IngestError, IngestResult},
    mapper::{UserRow, map_record},
    record::SourceRecord,
};

pub const DEFAULT_BATCH_SIZE: usize = 1000;
/// Four bound parameters per row must stay under SQLite's 32766 limit.
pub const MAX_BATCH_SIZE: usize = 8191;
const PARAMS_PER_ROW: usize = 4;

const CREATE_USERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        age INTEGER NOT NULL,
        address TEXT,
        additional_info TEXT
    );
";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredUser {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub address: Option<String>,
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertReport {
    pub inserted: usize,
    pub batch_sizes: Vec<usize>,
}

pub struct UserStore {
    conn: Connection,
}

impl UserStore {
    pub fn open(path: impl AsRef<Path>) -> IngestResult<Self> {
        let path = path.as_ref();
        debug!("Opening users store at {path:?}");
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.initialize()?;
        Ok(store)
    }

    pub fn open_in_memory() -> IngestResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> IngestResult<()> {
        self.conn.execute_batch(CREATE_USERS_TABLE)?;
        Ok(())
    }

    /// Maps and writes every record, or nothing.
    pub fn insert_records(
        &mut self,
        records: &[SourceRecord],
        batch_size: usize,
    ) -> IngestResult<InsertReport> {
        validate_batch_size(batch_size)?;
        let tx = self.conn.transaction().map_err(store_write)?;
        match write_batches(&tx, records, batch_size) {
            Ok(report) => {
                tx.commit().map_err(store_write)?;
                info!(
                    "Successfully inserted {} records into database",
                    report.inserted
                );
                Ok(report)
            }
            Err(err) => {
                warn!("Rolling back ingestion run: {err}");
                tx.rollback()?;
                Err(err)
            }
        }
    }

    pub fn list_users(&self) -> IngestResult<Vec<StoredUser>> {
        let mut statement = self.conn.prepare(
            "SELECT id, name, age, address, additional_info FROM users ORDER BY id ASC",
        )?;
        let rows = statement.query_map([], |row| {
            Ok(StoredUser {
                id: row.get(0)?,
                name: row.get(1)?,
                age: row.get(2)?,
                address: row.get(3)?,
                additional_info: row.get(4)?,
            })
        })?;
        let mut users = Vec::new();
        for user in rows {
            users.push(user?);
        }
        Ok(users)
    }

    pub fn ages(&self) -> IngestResult<Vec<i64>> {
        let mut statement = self.conn.prepare("SELECT age FROM users")?;
        let rows = statement.query_map([], |row| row.get(0))?;
        let mut ages = Vec::new();
        for age in rows {
            ages.push(age?);
        }
        Ok(ages)
    }

    pub fn count(&self) -> IngestResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Empties the table and restarts id numbering at 1. Safe on an empty table.
    pub fn clear(&mut self) -> IngestResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM users", [])?;
        tx.execute("DELETE FROM sqlite_sequence WHERE name = 'users'", [])?;
        tx.commit()?;
        info!("All users cleared from database");
        Ok(())
    }
}

pub fn validate_batch_size(batch_size: usize) -> IngestResult<()> {
    if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
        return Err(IngestError::invalid_option(format!(
            "batch size must be between 1 and {MAX_BATCH_SIZE}, got {batch_size}"
        )));
    }
    Ok(())
}

fn write_batches(
    tx: &Transaction<'_>,
    records: &[SourceRecord],
    batch_size: usize,
) -> IngestResult<InsertReport> {
    let total = records.len();
    let mut report = InsertReport::default();
    for batch in records.chunks(batch_size) {
        let rows = batch
            .iter()
            .map(|source| {
                map_record(&source.record).map_err(|err| IngestError::at_line(source.line, err))
            })
            .collect::<IngestResult<Vec<_>>>()?;
        insert_batch(tx, &rows).map_err(store_write)?;
        report.inserted += rows.len();
        report.batch_sizes.push(rows.len());
        info!("Inserted {} / {} records", report.inserted, total);
    }
    Ok(report)
}

fn insert_batch(tx: &Transaction<'_>, rows: &[UserRow]) -> rusqlite::Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }
    let placeholders = (0..rows.len())
        .map(|idx| {
            let base = idx * PARAMS_PER_ROW;
            format!("(?{}, ?{}, ?{}, ?{})", base + 1, base + 2, base + 3, base + 4)
        })
        .join(", ");
    let sql = format!(
        "INSERT INTO users (name, age, address, additional_info) VALUES {placeholders}"
    );
    let params = rows.iter().flat_map(|row| {
        let values: [&dyn ToSql; PARAMS_PER_ROW] =
            [&row.name, &row.age, &row.address, &row.additional_info];
        values
    });
    let mut statement = tx.prepare_cached(&sql)?;
    statement.execute(params_from_iter(params))
}

fn store_write(err: rusqlite::Error) -> IngestError {
    IngestError::StoreWrite(err.to_string())
}
