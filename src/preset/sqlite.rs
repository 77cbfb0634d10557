//! SQLite-backed preset store.
//!
//! One `Presets` table. `createdAt` is stored as Unix microseconds so that
//! ordering in SQL matches chronological order.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::config::CoreConfig;
use crate::error::{Operation, PresetError, PresetResult};
use crate::preset::store::{PresetStore, normalize_query};
use crate::preset::types::{MAX_NAME_LEN, Preset, PresetId, PresetSummary, SavePresetRequest};

pub struct SqlitePresetStore {
    conn: Mutex<Connection>,
}

impl SqlitePresetStore {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> PresetResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PresetError::transport(Operation::Load, e))?;
        }
        let conn = Connection::open(path).map_err(|e| PresetError::transport(Operation::Load, e))?;
        info!("opened preset database at {}", path.display());
        Self::from_connection(conn)
    }

    /// Open the database named by `config.database_path`.
    pub fn open_configured(config: &CoreConfig) -> PresetResult<Self> {
        Self::open(&config.database_path)
    }

    pub fn open_in_memory() -> PresetResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| PresetError::transport(Operation::Load, e))?;
        Self::from_connection(conn)
    }

    /// Wrap an existing connection, creating the `Presets` table if missing.
    pub fn from_connection(conn: Connection) -> PresetResult<Self> {
        conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS Presets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL CHECK (length(name) <= {MAX_NAME_LEN}),
                rawCode TEXT NOT NULL,
                controlsJson TEXT NOT NULL,
                createdAt INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_presets_created ON Presets (createdAt DESC, id DESC);
            "
        ))
        .map_err(|e| PresetError::transport(Operation::Load, e))?;
        Ok(SqlitePresetStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self, operation: Operation) -> PresetResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PresetError::transport(operation, "database lock poisoned"))
    }

    fn query_summaries(
        &self,
        operation: Operation,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> PresetResult<Vec<PresetSummary>> {
        let conn = self.conn(operation)?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| PresetError::transport(operation, e))?;
        let rows = stmt
            .query_map(args, summary_from_row)
            .map_err(|e| PresetError::transport(operation, e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| PresetError::transport(operation, e))
    }
}

fn timestamp(micros: i64, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, micros))
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<PresetSummary> {
    Ok(PresetSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: timestamp(row.get(2)?, 2)?,
    })
}

fn preset_from_row(row: &Row<'_>) -> rusqlite::Result<Preset> {
    Ok(Preset {
        id: row.get(0)?,
        name: row.get(1)?,
        raw_code: row.get(2)?,
        controls_json: row.get(3)?,
        created_at: timestamp(row.get(4)?, 4)?,
    })
}

impl PresetStore for SqlitePresetStore {
    fn save(&self, request: &SavePresetRequest) -> PresetResult<PresetId> {
        request.validate()?;

        let conn = self.conn(Operation::Save)?;
        let created_at = Utc::now().timestamp_micros();
        conn.execute(
            "INSERT INTO Presets (name, rawCode, controlsJson, createdAt) VALUES (?1, ?2, ?3, ?4)",
            params![request.name, request.raw, request.controls_json, created_at],
        )
        .map_err(|e| PresetError::transport(Operation::Save, e))?;
        let id = conn.last_insert_rowid();

        info!("saved preset {id} '{}'", request.name);
        Ok(id)
    }

    fn list_all(&self) -> PresetResult<Vec<PresetSummary>> {
        self.query_summaries(
            Operation::List,
            "SELECT id, name, createdAt FROM Presets ORDER BY createdAt DESC, id DESC",
            &[],
        )
    }

    fn search_by_name(&self, query: &str) -> PresetResult<Vec<PresetSummary>> {
        match normalize_query(query) {
            None => self.list_all(),
            // instr() is an ordinal, case-sensitive containment test.
            Some(needle) => self.query_summaries(
                Operation::Search,
                "SELECT id, name, createdAt FROM Presets WHERE instr(name, ?1) > 0 \
                 ORDER BY createdAt DESC, id DESC",
                &[&needle],
            ),
        }
    }

    fn get_by_id(&self, id: PresetId) -> PresetResult<Preset> {
        let conn = self.conn(Operation::Load)?;
        let preset = conn
            .query_row(
                "SELECT id, name, rawCode, controlsJson, createdAt FROM Presets WHERE id = ?1",
                params![id],
                preset_from_row,
            )
            .optional()
            .map_err(|e| PresetError::transport(Operation::Load, e))?;
        preset.ok_or_else(|| {
            debug!("preset {id} not found");
            PresetError::NotFound { id }
        })
    }
}

// ── Tests ───────────────────────────────────────────────────
