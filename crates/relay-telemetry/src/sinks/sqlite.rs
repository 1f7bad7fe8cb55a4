use std::path::Path;

use parking_lot::Mutex;
use relay_core::{ResultSink, RunId, StageResult};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::TelemetryError;

/// A stage result as read back from the database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: i64,
    pub run_id: String,
    pub stage_index: i64,
    pub stage_name: String,
    pub succeeded: bool,
    pub output: String,
    pub error: Option<String>,
    pub recorded_at: String,
    pub duration_ms: i64,
}

/// Durable sink that persists every stage result to SQLite.
pub struct SqliteResultSink {
    conn: Mutex<Connection>,
}

impl SqliteResultSink {
    pub fn open(db_path: &Path) -> Result<Self, TelemetryError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, TelemetryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, TelemetryError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS stage_results (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 run_id TEXT NOT NULL,
                 stage_index INTEGER NOT NULL,
                 stage_name TEXT NOT NULL,
                 succeeded INTEGER NOT NULL,
                 output TEXT NOT NULL,
                 error TEXT,
                 recorded_at TEXT NOT NULL,
                 duration_ms INTEGER NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_stage_results_run ON stage_results(run_id, stage_index);",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn insert(&self, result: &StageResult) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO stage_results
                 (run_id, stage_index, stage_name, succeeded, output, error, recorded_at, duration_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                result.run_id.as_str(),
                result.stage_index as i64,
                result.stage_name,
                result.succeeded,
                result.output,
                result.error,
                result.recorded_at.to_rfc3339(),
                result.duration_ms as i64,
            ],
        )?;
        Ok(())
    }

    /// Results for one run, in stage order.
    pub fn results_for_run(&self, run_id: &RunId) -> Result<Vec<StoredResult>, TelemetryError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, run_id, stage_index, stage_name, succeeded, output, error, recorded_at, duration_ms
             FROM stage_results WHERE run_id = ?1 ORDER BY stage_index ASC, id ASC",
        )?;
        let rows = stmt.query_map([run_id.as_str()], |row| {
            Ok(StoredResult {
                id: row.get(0)?,
                run_id: row.get(1)?,
                stage_index: row.get(2)?,
                stage_name: row.get(3)?,
                succeeded: row.get(4)?,
                output: row.get(5)?,
                error: row.get(6)?,
                recorded_at: row.get(7)?,
                duration_ms: row.get(8)?,
            })
        })?;

        let results = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(results)
    }

    pub fn count(&self) -> Result<i64, TelemetryError> {
        let conn = self.conn.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM stage_results", [], |row| row.get(0))?)
    }
}

impl ResultSink for SqliteResultSink {
    fn record(&self, result: &StageResult) {
        if let Err(e) = self.insert(result) {
            tracing::warn!(
                run_id = %result.run_id,
                stage = %result.stage_name,
                error = %e,
                "failed to persist stage result"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_database_counts_zero() {
        let sink = SqliteResultSink::in_memory().unwrap();
        assert_eq!(sink.count().unwrap(), 0);
    }

    #[test]
    fn records_and_reads_back_in_order() {
        let sink = SqliteResultSink::in_memory().unwrap();
        let id = RunId::new();

        sink.record(&StageResult::success(id.clone(), 0, "A", "SUMMARY", 12));
        sink.record(&StageResult::failure(id.clone(), 1, "B", "rate limited", 4));

        let rows = sink.results_for_run(&id).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stage_name, "A");
        assert!(rows[0].succeeded);
        assert_eq!(rows[0].output, "SUMMARY");
        assert!(rows[0].error.is_none());
        assert_eq!(rows[0].duration_ms, 12);
        assert_eq!(rows[1].stage_index, 1);
        assert!(!rows[1].succeeded);
        assert_eq!(rows[1].output, "");
        assert_eq!(rows[1].error.as_deref(), Some("rate limited"));
    }

    #[test]
    fn runs_are_isolated() {
        let sink = SqliteResultSink::in_memory().unwrap();
        let first = RunId::new();
        let second = RunId::new();

        sink.record(&StageResult::success(first.clone(), 0, "A", "one", 1));
        sink.record(&StageResult::success(second.clone(), 0, "A", "two", 1));

        assert_eq!(sink.count().unwrap(), 2);
        assert_eq!(sink.results_for_run(&first).unwrap()[0].output, "one");
        assert_eq!(sink.results_for_run(&second).unwrap()[0].output, "two");
    }

    #[test]
    fn file_database_persists_across_opens() {
        let path = std::env::temp_dir()
            .join(format!("relay-test-db-{}", uuid::Uuid::now_v7()))
            .join("results.db");
        let id = RunId::new();

        {
            let sink = SqliteResultSink::open(&path).unwrap();
            sink.record(&StageResult::success(id.clone(), 0, "A", "kept", 1));
        }

        let sink = SqliteResultSink::open(&path).unwrap();
        let rows = sink.results_for_run(&id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].output, "kept");
    }
}
