//! SQLite-backed document store and number allocator.
//!
//! The allocation contract lives here: idempotency lookup, counter
//! increment and skeletal record insert all happen inside one
//! `BEGIN IMMEDIATE` transaction, so concurrent commits serialize on
//! the write lock and the counter can never hand out the same value
//! twice or skip one.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::model::DocumentKind;
use crate::numbering::{AllocatedNumber, NumberAllocator, NumberFormat};
use crate::store::{DocumentStore, StoredDocument};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS counters (
    kind  TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS documents (
    id              TEXT PRIMARY KEY,
    kind            TEXT NOT NULL,
    number_value    INTEGER NOT NULL,
    number          TEXT NOT NULL,
    idempotency_key TEXT UNIQUE,
    customer_name   TEXT NOT NULL DEFAULT '',
    gross_total     TEXT NOT NULL DEFAULT '0',
    pdf_path        TEXT
);
";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

#[derive(Debug, Error)]
#[error("unknown document kind '{0}'")]
struct UnknownKind(String);

fn kind_from_str(s: &str) -> std::result::Result<DocumentKind, UnknownKind> {
    match s {
        "offer" => Ok(DocumentKind::Offer),
        "invoice" => Ok(DocumentKind::Invoice),
        other => Err(UnknownKind(other.to_string())),
    }
}

fn conversion(index: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

fn map_document(row: &Row<'_>) -> rusqlite::Result<StoredDocument> {
    let id: String = row.get(0)?;
    let kind: String = row.get(1)?;
    let number_value: i64 = row.get(2)?;
    let gross: String = row.get(6)?;
    Ok(StoredDocument {
        id: Uuid::parse_str(&id).map_err(|e| conversion(0, e))?,
        kind: kind_from_str(&kind).map_err(|e| conversion(1, e))?,
        number_value: number_value as u64,
        number: row.get(3)?,
        idempotency_key: row.get(4)?,
        customer_name: row.get(5)?,
        gross_total: Decimal::from_str(&gross).map_err(|e| conversion(6, e))?,
        pdf_path: row.get(7)?,
    })
}

const SELECT_COLUMNS: &str =
    "id, kind, number_value, number, idempotency_key, customer_name, gross_total, pdf_path";

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn: Mutex::new(conn) })
    }

    fn locked(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| EngineError::Storage("sqlite connection lock poisoned".to_string()))
    }
}

impl DocumentStore for SqliteStore {
    fn find(&self, id: Uuid) -> Result<Option<StoredDocument>> {
        let conn = self.locked()?;
        let sql = format!("SELECT {SELECT_COLUMNS} FROM documents WHERE id = ?1");
        Ok(conn
            .query_row(&sql, params![id.to_string()], map_document)
            .optional()?)
    }

    fn find_by_idempotency_key(&self, key: &str) -> Result<Option<StoredDocument>> {
        let conn = self.locked()?;
        let sql = format!("SELECT {SELECT_COLUMNS} FROM documents WHERE idempotency_key = ?1");
        Ok(conn.query_row(&sql, params![key], map_document).optional()?)
    }

    fn find_by_number(&self, kind: DocumentKind, number: &str) -> Result<Option<StoredDocument>> {
        let conn = self.locked()?;
        let sql = format!("SELECT {SELECT_COLUMNS} FROM documents WHERE kind = ?1 AND number = ?2");
        Ok(conn
            .query_row(&sql, params![kind.as_str(), number], map_document)
            .optional()?)
    }

    fn update(&self, document: &StoredDocument) -> Result<()> {
        let conn = self.locked()?;
        conn.execute(
            "INSERT INTO documents \
             (id, kind, number_value, number, idempotency_key, customer_name, gross_total, pdf_path) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             ON CONFLICT(id) DO UPDATE SET \
             customer_name = excluded.customer_name, \
             gross_total = excluded.gross_total, \
             pdf_path = excluded.pdf_path",
            params![
                document.id.to_string(),
                document.kind.as_str(),
                document.number_value as i64,
                document.number,
                document.idempotency_key,
                document.customer_name,
                document.gross_total.to_string(),
                document.pdf_path,
            ],
        )?;
        Ok(())
    }
}

impl NumberAllocator for SqliteStore {
    fn allocate(
        &self,
        kind: DocumentKind,
        idempotency_key: &str,
        document_id: Uuid,
    ) -> Result<AllocatedNumber> {
        let mut conn = self.locked()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = tx
            .query_row(
                "SELECT number_value, number FROM documents WHERE idempotency_key = ?1",
                params![idempotency_key],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        if let Some((value, display)) = existing {
            tx.commit()?;
            return Ok(AllocatedNumber { value: value as u64, display, replayed: true });
        }

        tx.execute(
            "INSERT INTO counters (kind, value) VALUES (?1, 0) \
             ON CONFLICT(kind) DO NOTHING",
            params![kind.as_str()],
        )?;
        let value: i64 = tx.query_row(
            "UPDATE counters SET value = value + 1 WHERE kind = ?1 RETURNING value",
            params![kind.as_str()],
            |row| row.get(0),
        )?;
        let display = NumberFormat::for_kind(kind).format(value as u64);
        tx.execute(
            "INSERT INTO documents (id, kind, number_value, number, idempotency_key) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                document_id.to_string(),
                kind.as_str(),
                value,
                display,
                idempotency_key,
            ],
        )?;
        tx.commit()?;
        Ok(AllocatedNumber { value: value as u64, display, replayed: false })
    }
}
