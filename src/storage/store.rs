//! Study store operations.

use super::error::{Result, StorageError};
use super::schema;
use crate::optim::{Direction, Trial, TrialStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Attribute holding the error message of a failed trial
pub const ERROR_ATTR: &str = "error";

/// A persisted study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRecord {
    pub id: i64,
    pub name: String,
    pub direction: Direction,
    pub created_at: DateTime<Utc>,
}

/// A persisted trial with its attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTrial {
    pub id: i64,
    #[serde(flatten)]
    pub trial: Trial,
    pub attrs: BTreeMap<String, serde_json::Value>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl StoredTrial {
    /// Error message recorded for a failed trial
    pub fn error(&self) -> Option<&str> {
        self.attrs.get(ERROR_ATTR).and_then(|v| v.as_str())
    }
}

/// SQLite-backed persistence for studies and their trials
#[derive(Debug)]
pub struct StudyStore {
    path: String,
    conn: Mutex<Connection>,
}

fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl StudyStore {
    /// Open or create a database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Backend(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(path.as_ref())
            .map_err(|e| StorageError::Backend(format!("Failed to open {path_str}: {e}")))?;
        Self::with_connection(conn, path_str)
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Backend(format!("Failed to open in-memory db: {e}")))?;
        Self::with_connection(conn, ":memory:".to_string())
    }

    fn with_connection(conn: Connection, path: String) -> Result<Self> {
        schema::init_schema(&conn)
            .map_err(|e| StorageError::Backend(format!("Failed to initialize schema: {e}")))?;
        tracing::debug!(path = %path, "study store opened");
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Backend(format!("Failed to acquire connection lock: {e}")))
    }

    pub fn schema_version(&self) -> Result<String> {
        let conn = self.lock_conn()?;
        Ok(schema::schema_version(&conn)?)
    }

    /// Create a study, or load it when it exists and `load_if_exists` is set
    pub fn create_study(
        &self,
        name: &str,
        direction: Direction,
        load_if_exists: bool,
    ) -> Result<StudyRecord> {
        if let Some(existing) = self.find_study(name)? {
            if !load_if_exists {
                return Err(StorageError::DuplicatedStudy(name.to_string()));
            }
            if existing.direction != direction {
                return Err(StorageError::DirectionMismatch {
                    study: name.to_string(),
                    stored: existing.direction.to_string(),
                    requested: direction.to_string(),
                });
            }
            tracing::info!(study = name, "resuming existing study");
            return Ok(existing);
        }

        let created_at = Utc::now();
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO studies (name, direction, created_at) VALUES (?1, ?2, ?3)",
            params![name, direction.as_str(), created_at.to_rfc3339()],
        )
        .map_err(|e| StorageError::Backend(format!("Failed to create study: {e}")))?;
        let id = conn.last_insert_rowid();
        tracing::info!(study = name, id, "created study");

        Ok(StudyRecord {
            id,
            name: name.to_string(),
            direction,
            created_at,
        })
    }

    fn find_study(&self, name: &str) -> Result<Option<StudyRecord>> {
        let conn = self.lock_conn()?;
        conn.query_row(
            "SELECT id, name, direction, created_at FROM studies WHERE name = ?1",
            [name],
            |row| {
                let id: i64 = row.get(0)?;
                let name: String = row.get(1)?;
                let direction: String = row.get(2)?;
                let created: String = row.get(3)?;
                Ok((id, name, direction, created))
            },
        )
        .optional()
        .map_err(|e| StorageError::Backend(format!("Failed to query study: {e}")))?
        .map(|(id, name, direction, created)| -> Result<StudyRecord> {
            let direction: Direction = direction.parse().map_err(StorageError::Backend)?;
            Ok(StudyRecord {
                id,
                name,
                direction,
                created_at: parse_time(&created),
            })
        })
        .transpose()
    }

    /// Load a study by name
    pub fn get_study(&self, name: &str) -> Result<StudyRecord> {
        self.find_study(name)?
            .ok_or_else(|| StorageError::StudyNotFound(name.to_string()))
    }

    /// All studies, oldest first
    pub fn list_studies(&self) -> Result<Vec<StudyRecord>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare("SELECT name FROM studies ORDER BY id")
            .map_err(|e| StorageError::Backend(format!("Failed to prepare query: {e}")))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        drop(stmt);
        drop(conn);

        names.iter().map(|name| self.get_study(name)).collect()
    }

    /// Start a new trial; its number is one past the study's current maximum
    pub fn create_trial(&self, study_id: i64) -> Result<(i64, usize)> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM studies WHERE id = ?1)",
            [study_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StorageError::StudyNotFound(study_id.to_string()));
        }

        let number: i64 = tx.query_row(
            "SELECT COALESCE(MAX(number) + 1, 0) FROM trials WHERE study_id = ?1",
            [study_id],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO trials (study_id, number, status, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                study_id,
                number,
                TrialStatus::Running.as_str(),
                Utc::now().to_rfc3339()
            ],
        )?;
        let trial_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok((trial_id, number as usize))
    }

    fn trial_status(conn: &Connection, trial_id: i64) -> Result<TrialStatus> {
        let status: Option<String> = conn
            .query_row("SELECT status FROM trials WHERE id = ?1", [trial_id], |row| {
                row.get(0)
            })
            .optional()?;
        status
            .ok_or(StorageError::TrialNotFound(trial_id))?
            .parse()
            .map_err(StorageError::Backend)
    }

    /// Record sampled parameters of a running trial
    pub fn set_trial_params(&self, trial_id: i64, params: &HashMap<String, f64>) -> Result<()> {
        let mut conn = self.lock_conn()?;
        if Self::trial_status(&conn, trial_id)? != TrialStatus::Running {
            return Err(StorageError::InvalidState(format!(
                "trial {trial_id} is finished, parameters are immutable"
            )));
        }
        let tx = conn.transaction()?;
        for (name, value) in params {
            tx.execute(
                "INSERT INTO trial_params (trial_id, name, value) VALUES (?1, ?2, ?3)",
                params![trial_id, name, value],
            )
            .map_err(|e| StorageError::Backend(format!("Failed to store param '{name}': {e}")))?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Set (or replace) a JSON attribute on a trial
    pub fn set_trial_attr(&self, trial_id: i64, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.lock_conn()?;
        Self::trial_status(&conn, trial_id)?;
        conn.execute(
            "INSERT OR REPLACE INTO trial_attrs (trial_id, key, value) VALUES (?1, ?2, ?3)",
            params![trial_id, key, value.to_string()],
        )?;
        Ok(())
    }

    /// Move a running trial to its final state
    ///
    /// Completed trials must carry a finite value; failed and pruned trials
    /// never do.
    pub fn finish_trial(&self, trial_id: i64, status: TrialStatus, value: Option<f64>) -> Result<()> {
        let value = match (status, value) {
            (TrialStatus::Running, _) => {
                return Err(StorageError::InvalidState(
                    "cannot finish a trial as running".to_string(),
                ))
            }
            (TrialStatus::Completed, Some(v)) if v.is_finite() => Some(v),
            (TrialStatus::Completed, other) => {
                return Err(StorageError::InvalidState(format!(
                    "completed trial {trial_id} needs a finite value, got {other:?}"
                )))
            }
            (_, _) => None,
        };

        let conn = self.lock_conn()?;
        let current = Self::trial_status(&conn, trial_id)?;
        if current != TrialStatus::Running {
            return Err(StorageError::InvalidState(format!(
                "trial {trial_id} is already {current}"
            )));
        }
        conn.execute(
            "UPDATE trials SET status = ?1, value = ?2, finished_at = ?3 WHERE id = ?4",
            params![status.as_str(), value, Utc::now().to_rfc3339(), trial_id],
        )?;
        Ok(())
    }

    /// Mark trials left running by an earlier session as failed
    pub fn fail_stale_trials(&self, study_id: i64) -> Result<usize> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let message = serde_json::Value::from("stale: session ended while the trial was running");
        tx.execute(
            "INSERT OR REPLACE INTO trial_attrs (trial_id, key, value)
             SELECT id, ?2, ?3 FROM trials WHERE study_id = ?1 AND status = 'running'",
            params![study_id, ERROR_ATTR, message.to_string()],
        )?;
        let n = tx.execute(
            "UPDATE trials SET status = 'failed', finished_at = ?2
             WHERE study_id = ?1 AND status = 'running'",
            params![study_id, Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        if n > 0 {
            tracing::warn!(study_id, count = n, "marked stale running trials as failed");
        }
        Ok(n)
    }

    /// All trials of a study ordered by number
    pub fn load_trials(&self, study_id: i64) -> Result<Vec<StoredTrial>> {
        let conn = self.lock_conn()?;

        let mut params_by_trial: HashMap<i64, HashMap<String, f64>> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                "SELECT p.trial_id, p.name, p.value FROM trial_params p
                 JOIN trials t ON t.id = p.trial_id WHERE t.study_id = ?1",
            )?;
            let rows = stmt.query_map([study_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, f64>(2)?))
            })?;
            for row in rows {
                let (trial_id, name, value) = row?;
                params_by_trial.entry(trial_id).or_default().insert(name, value);
            }
        }

        let mut attrs_by_trial: HashMap<i64, BTreeMap<String, serde_json::Value>> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                "SELECT a.trial_id, a.key, a.value FROM trial_attrs a
                 JOIN trials t ON t.id = a.trial_id WHERE t.study_id = ?1",
            )?;
            let rows = stmt.query_map([study_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })?;
            for row in rows {
                let (trial_id, key, raw) = row?;
                let value = serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw));
                attrs_by_trial.entry(trial_id).or_default().insert(key, value);
            }
        }

        let mut stmt = conn.prepare(
            "SELECT id, number, status, value, started_at, finished_at
             FROM trials WHERE study_id = ?1 ORDER BY number",
        )?;
        let rows = stmt.query_map([study_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<f64>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut trials = Vec::new();
        for row in rows {
            let (id, number, status, value, started, finished) = row?;
            let status: TrialStatus = status.parse().map_err(StorageError::Backend)?;
            trials.push(StoredTrial {
                id,
                trial: Trial {
                    number: number as usize,
                    params: params_by_trial.remove(&id).unwrap_or_default(),
                    value,
                    status,
                },
                attrs: attrs_by_trial.remove(&id).unwrap_or_default(),
                started_at: parse_time(&started),
                finished_at: finished.as_deref().map(parse_time),
            });
        }
        Ok(trials)
    }

    /// Best completed trial under the study's direction
    pub fn best_trial(&self, study: &StudyRecord) -> Result<Option<StoredTrial>> {
        let mut best: Option<StoredTrial> = None;
        for t in self.load_trials(study.id)? {
            let Some(value) = t.trial.value.filter(|_| t.trial.is_complete()) else {
                continue;
            };
            let better = match best.as_ref().and_then(|b| b.trial.value) {
                Some(current) => study.direction.is_better(value, current),
                None => true,
            };
            if better {
                best = Some(t);
            }
        }
        Ok(best)
    }
}
