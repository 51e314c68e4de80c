use std::path::Path;

use contracts::SimulationResult;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("sqlite store is not attached")]
    NotAttached,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchivedResultSummary {
    pub scenario_id: String,
    pub region: String,
    pub baseline_year: i32,
    pub target_year: i32,
    pub stress_level: String,
    pub created_at: String,
}

#[derive(Debug)]
pub struct SqliteResultStore {
    conn: Connection,
}

impl SqliteResultStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.configure()?;
        store.migrate()?;
        Ok(store)
    }

    /// Inserts or replaces the archived copy of `result`.
    pub fn persist_result(&mut self, result: &SimulationResult) -> Result<(), PersistenceError> {
        let result_json = serde_json::to_string(result)?;
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO results (
                scenario_id,
                schema_version,
                region,
                baseline_year,
                target_year,
                stress_level,
                result_json,
                created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(scenario_id) DO UPDATE SET
                schema_version = excluded.schema_version,
                result_json = excluded.result_json,
                created_at = excluded.created_at",
            params![
                result.scenario_id.as_str(),
                result.schema_version.as_str(),
                result.metadata.region.as_str(),
                i64::from(result.metadata.baseline_year),
                i64::from(result.metadata.target_year),
                result.climate_stress.crop_stress_level.as_str(),
                result_json,
                result.metadata.generated_at.to_rfc3339(),
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    pub fn load_result(
        &self,
        scenario_id: &str,
    ) -> Result<Option<SimulationResult>, PersistenceError> {
        let payload = self
            .conn
            .query_row(
                "SELECT result_json FROM results WHERE scenario_id = ?1",
                params![scenario_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        payload
            .map(|json| serde_json::from_str::<SimulationResult>(&json))
            .transpose()
            .map_err(PersistenceError::from)
    }

    /// Most recently archived first.
    pub fn list_results(
        &self,
        limit: usize,
    ) -> Result<Vec<ArchivedResultSummary>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT scenario_id, region, baseline_year, target_year, stress_level, created_at
             FROM results
             ORDER BY created_at DESC, scenario_id ASC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
            Ok(ArchivedResultSummary {
                scenario_id: row.get(0)?,
                region: row.get(1)?,
                baseline_year: row.get(2)?,
                target_year: row.get(3)?,
                stress_level: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(summaries)
    }

    fn configure(&mut self) -> Result<(), PersistenceError> {
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }

    fn migrate(&mut self) -> Result<(), PersistenceError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS results (
                scenario_id TEXT PRIMARY KEY,
                schema_version TEXT NOT NULL,
                region TEXT NOT NULL,
                baseline_year INTEGER NOT NULL,
                target_year INTEGER NOT NULL,
                stress_level TEXT NOT NULL,
                result_json TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_results_region_year ON results(region, target_year);
            CREATE INDEX IF NOT EXISTS idx_results_created_at ON results(created_at);
            ",
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO schema_migrations(version, name, applied_at)
             VALUES(1, 'results_v1', datetime('now'))",
            [],
        )?;

        Ok(())
    }
}
