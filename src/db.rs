//! SQLite storage for patient records.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use thiserror::Error;

use crate::visits::DATE_FORMAT;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS pasien (
    id INTEGER PRIMARY KEY,
    nama TEXT,
    tanggal_pemeriksaan TEXT
);
"#;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Stored value out of range: {0}")]
    OutOfRange(String),
}

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    pub id: i64,
    pub name: String,
    pub examination_date: NaiveDate,
}

/// Owns the single connection used by one intake form.
pub struct PatientStore {
    conn: Connection,
}

impl PatientStore {
    /// Open database at path, creating the file and table if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn insert_patient(
        &self,
        name: &str,
        examination_date: NaiveDate,
    ) -> DbResult<PatientRecord> {
        self.conn.execute(
            "INSERT INTO pasien (nama, tanggal_pemeriksaan) VALUES (?1, ?2)",
            params![name, examination_date.format(DATE_FORMAT).to_string()],
        )?;
        Ok(PatientRecord {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            examination_date,
        })
    }

    pub fn patient_count(&self) -> DbResult<u32> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pasien", [], |row| row.get(0))?;
        u32::try_from(count).map_err(|_| DbError::OutOfRange(format!("row count {count}")))
    }
}
