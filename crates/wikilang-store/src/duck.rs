//! DuckDB corpus store.

use std::path::Path;

use arrow::array::{Array, Int64Array, LargeStringArray, StringArray};
use arrow::record_batch::RecordBatch;
use duckdb::Connection;
use tracing::{info, warn};

use crate::corpus::{CorpusStore, Partition, Role};
use crate::StoreError;

/// DuckDB store for language corpora.
///
/// Two tables, `train` and `test`, each hold `(language, text)` rows. A
/// partition write deletes the language's rows from both tables and inserts
/// the new texts inside one transaction, so a language has at most one row
/// per table.
///
/// Supports both in-memory (ephemeral) and persistent (file-backed) modes.
/// Use [`open`](Self::open) for in-memory and [`open_persistent`](Self::open_persistent)
/// for file-backed storage that survives across process restarts.
pub struct DuckStore {
    conn: Connection,
}

impl DuckStore {
    /// Open an in-memory DuckDB database.
    pub fn open() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Open or create a persistent DuckDB database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS train (language VARCHAR NOT NULL, text VARCHAR NOT NULL);
             CREATE TABLE IF NOT EXISTS test (language VARCHAR NOT NULL, text VARCHAR NOT NULL);",
        )?;
        Ok(Self { conn })
    }

    // ── Counts ──

    /// Rows stored for `language` in the `role` table.
    pub fn row_count(&self, role: Role, language: &str) -> Result<usize, StoreError> {
        let sql = format!(
            "SELECT count(*)::BIGINT AS cnt FROM {} WHERE language = ?",
            role.as_str()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([language])?.collect();
        let batch = batches.first().ok_or(StoreError::NoResults)?;
        let col = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| StoreError::Other("count column not i64".into()))?;
        Ok(col.value(0) as usize)
    }

    // ── Internals ──

    fn replace_rows(
        &self,
        language: &str,
        training_text: &str,
        test_text: &str,
    ) -> Result<(), StoreError> {
        // Delete then insert: re-scraping replaces the whole corpus.
        self.conn
            .execute("DELETE FROM train WHERE language = ?", [language])?;
        self.conn
            .execute("DELETE FROM test WHERE language = ?", [language])?;
        self.conn.execute(
            "INSERT INTO train (language, text) VALUES (?, ?)",
            [language, training_text],
        )?;
        self.conn.execute(
            "INSERT INTO test (language, text) VALUES (?, ?)",
            [language, test_text],
        )?;
        Ok(())
    }

    fn read_text(&self, role: Role, language: &str) -> Result<Option<String>, StoreError> {
        let sql = format!("SELECT text FROM {} WHERE language = ?", role.as_str());
        let mut stmt = self.conn.prepare(&sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([language])?.collect();
        Ok(batches
            .iter()
            .find(|b| b.num_rows() > 0)
            .and_then(|b| get_string(b.column(0).as_ref(), 0)))
    }
}

impl CorpusStore for DuckStore {
    fn write_partition(
        &self,
        language: &str,
        training_text: &str,
        test_text: &str,
    ) -> Result<(), StoreError> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        if let Err(e) = self.replace_rows(language, training_text, test_text) {
            if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                warn!(language, error = %rollback, "rollback failed");
            }
            return Err(e);
        }
        self.conn.execute_batch("COMMIT")?;
        info!(
            language,
            train_bytes = training_text.len(),
            test_bytes = test_text.len(),
            "wrote corpus partition"
        );
        Ok(())
    }

    fn read_partition(&self, language: &str) -> Result<Partition, StoreError> {
        let train = self
            .read_text(Role::Train, language)?
            .ok_or_else(|| StoreError::NotFound(language.to_string()))?;
        let test = self.read_text(Role::Test, language)?.unwrap_or_default();
        Ok(Partition { train, test })
    }

    fn languages(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT language FROM train ORDER BY language")?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([])?.collect();
        let mut out = Vec::new();
        for batch in &batches {
            let col = batch.column(0);
            for row in 0..batch.num_rows() {
                if let Some(code) = get_string(col.as_ref(), row) {
                    out.push(code);
                }
            }
        }
        Ok(out)
    }
}

/// Extract a string value from an Arrow array (handles Utf8 and LargeUtf8).
fn get_string(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row).to_string())
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row).to_string())
        })
}
