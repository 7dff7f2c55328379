//! `SQLite` key-value store for saved analyses.
//!
//! Values are JSON documents keyed by string. Analyses live under
//! `analysis:<id>` where `id` is an opaque random UUID.

use crate::error::{ChatlensError, Result, ResultExt};
use crate::model::{AnalysisResult, StoredAnalysisSummary};
use crate::perf::{STORAGE_LOOKUP, STORAGE_OPEN, STORAGE_SAVE, Timer};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA_VERSION: i32 = 1;

/// Key prefix for stored analyses.
pub const ANALYSIS_PREFIX: &str = "analysis:";

fn parse_rfc3339_or_epoch(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

/// `SQLite` storage manager
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let path = db_path.as_ref();
        let timer = Timer::start(STORAGE_OPEN);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ChatlensError::path_error("create", parent, e))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        let storage = Self { conn };
        storage.migrate()?;
        timer.stop();
        debug!(path = %path.display(), "Opened store");
        Ok(storage)
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be initialized.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    fn migrate(&self) -> Result<()> {
        let current_version = self.get_schema_version();

        if current_version < SCHEMA_VERSION {
            info!(
                "Migrating database from version {} to {}",
                current_version, SCHEMA_VERSION
            );
            self.create_schema()?;
            self.set_schema_version(SCHEMA_VERSION)?;
        }

        Ok(())
    }

    fn get_schema_version(&self) -> i32 {
        let result: std::result::Result<i32, _> = self.conn.query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| {
                let value: String = row.get(0)?;
                Ok(value.parse().unwrap_or(0))
            },
        );

        // Treat missing schema table as version 0.
        result.unwrap_or_default()
    }

    fn set_schema_version(&self, version: i32) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?)",
            params![version.to_string()],
        )?;
        Ok(())
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                stored_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_kv_stored_at ON kv(stored_at);
            ",
        )?;
        Ok(())
    }

    /// Store `value` as JSON under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Serialization or database errors.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let timer = Timer::start(STORAGE_SAVE);
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, stored_at) VALUES (?1, ?2, ?3)",
            params![key, json, Utc::now().to_rfc3339()],
        )?;
        timer.stop();
        Ok(())
    }

    /// Load the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Database errors, or a stored value that no longer deserializes as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let timer = Timer::start(STORAGE_LOOKUP);
        let json: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        timer.stop();

        json.map(|j| serde_json::from_str(&j))
            .transpose()
            .map_err(Into::into)
    }

    /// Remove `key`. Returns whether anything was deleted.
    ///
    /// # Errors
    ///
    /// Database errors.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    /// Keys starting with `prefix`, newest first.
    ///
    /// # Errors
    ///
    /// Database errors.
    pub fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1
             ORDER BY stored_at DESC, key",
        )?;
        let keys = stmt
            .query_map(params![prefix], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// Persist an analysis under a fresh id and return the id.
    ///
    /// # Errors
    ///
    /// Serialization or database errors.
    pub fn save_analysis(&self, analysis: &AnalysisResult) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.set(&analysis_key(&id), analysis)?;
        info!(id = %id, messages = analysis.total_messages(), "Saved analysis");
        Ok(id)
    }

    /// Load a stored analysis.
    ///
    /// # Errors
    ///
    /// [`ChatlensError::AnalysisNotFound`] when no analysis has this id.
    pub fn load_analysis(&self, id: &str) -> Result<AnalysisResult> {
        self.get(&analysis_key(id))?
            .ok_or_else(|| ChatlensError::analysis_not_found(id))
    }

    /// Delete a stored analysis.
    ///
    /// # Errors
    ///
    /// [`ChatlensError::AnalysisNotFound`] when no analysis has this id.
    pub fn delete_analysis(&self, id: &str) -> Result<()> {
        if self.delete(&analysis_key(id))? {
            Ok(())
        } else {
            Err(ChatlensError::analysis_not_found(id))
        }
    }

    /// Summaries of all stored analyses, newest first.
    ///
    /// # Errors
    ///
    /// Database errors or corrupt stored values.
    pub fn list_analyses(&self) -> Result<Vec<StoredAnalysisSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, value, stored_at FROM kv
             WHERE substr(key, 1, length(?1)) = ?1
             ORDER BY stored_at DESC, key",
        )?;
        let rows = stmt
            .query_map(params![ANALYSIS_PREFIX], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(key, value, stored_at)| {
                let analysis: AnalysisResult = serde_json::from_str(&value)?;
                Ok(StoredAnalysisSummary {
                    id: key[ANALYSIS_PREFIX.len()..].to_string(),
                    stored_at: parse_rfc3339_or_epoch(&stored_at),
                    total_messages: analysis.total_messages(),
                })
            })
            .collect()
    }
}

fn analysis_key(id: &str) -> String {
    format!("{ANALYSIS_PREFIX}{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PerSide;
    use tempfile::TempDir;

    fn sample_analysis(you: u64, them: u64) -> AnalysisResult {
        AnalysisResult {
            message_count: PerSide::new(you, them),
            ..AnalysisResult::default()
        }
    }

    #[test]
    fn test_create_database() {
        let storage = Storage::open_memory().unwrap();
        assert_eq!(storage.get_schema_version(), SCHEMA_VERSION);
        assert!(storage.list("").unwrap().is_empty());
    }

    #[test]
    fn test_set_get_delete() {
        let storage = Storage::open_memory().unwrap();
        storage.set("greeting", &vec!["hi", "there"]).unwrap();

        let value: Option<Vec<String>> = storage.get("greeting").unwrap();
        assert_eq!(value.unwrap(), vec!["hi", "there"]);

        assert!(storage.delete("greeting").unwrap());
        assert!(!storage.delete("greeting").unwrap());
        let gone: Option<Vec<String>> = storage.get("greeting").unwrap();
        assert!(gone.is_none());
    }

    #[test]
    fn test_set_replaces_value() {
        let storage = Storage::open_memory().unwrap();
        storage.set("k", &1).unwrap();
        storage.set("k", &2).unwrap();
        assert_eq!(storage.get::<i32>("k").unwrap(), Some(2));
        assert_eq!(storage.list("").unwrap().len(), 1);
    }

    #[test]
    fn test_list_matches_prefix_literally() {
        let storage = Storage::open_memory().unwrap();
        storage.set("analysis:1", &1).unwrap();
        storage.set("analysis_x", &2).unwrap();
        storage.set("other", &3).unwrap();
        assert_eq!(storage.list("analysis:").unwrap(), vec!["analysis:1"]);
        // '_' is not a wildcard here
        assert_eq!(storage.list("analysis_").unwrap(), vec!["analysis_x"]);
    }

    #[test]
    fn test_analysis_round_trip() {
        let storage = Storage::open_memory().unwrap();
        let analysis = sample_analysis(3, 4);

        let id = storage.save_analysis(&analysis).unwrap();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

        let loaded = storage.load_analysis(&id).unwrap();
        assert_eq!(loaded, analysis);

        let summaries = storage.list_analyses().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, id);
        assert_eq!(summaries[0].total_messages, 7);
    }

    #[test]
    fn test_missing_analysis_is_not_found() {
        let storage = Storage::open_memory().unwrap();
        assert!(matches!(
            storage.load_analysis("nope"),
            Err(ChatlensError::AnalysisNotFound { .. })
        ));
        assert!(matches!(
            storage.delete_analysis("nope"),
            Err(ChatlensError::AnalysisNotFound { .. })
        ));
    }

    #[test]
    fn test_ids_are_unique() {
        let storage = Storage::open_memory().unwrap();
        let a = storage.save_analysis(&sample_analysis(1, 0)).unwrap();
        let b = storage.save_analysis(&sample_analysis(1, 0)).unwrap();
        assert_ne!(a, b);
        assert_eq!(storage.list_analyses().unwrap().len(), 2);
    }

    #[test]
    fn test_file_database_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("chatlens.db");

        let id = {
            let storage = Storage::open(&path).unwrap();
            storage.save_analysis(&sample_analysis(2, 2)).unwrap()
        };

        let reopened = Storage::open(&path).unwrap();
        assert_eq!(reopened.load_analysis(&id).unwrap().total_messages(), 4);
    }
}
