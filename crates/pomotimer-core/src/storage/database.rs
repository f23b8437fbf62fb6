//! SQLite-backed key-value store and session log.
//!
//! Provides persistent storage for:
//! - User preferences (presets and alarm sound) as key-value records
//! - Completed sessions, for daily and all-time statistics

use std::path::Path;

use chrono::{DateTime, Duration, Local, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::data_dir;
use crate::error::{CoreError, DatabaseError};
use crate::timer::SessionType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub session_type: SessionType,
    /// Seconds actually spent in the session.
    pub duration_secs: u32,
    /// Finished early by the user.
    pub skipped: bool,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_sessions: u64,
    /// Focus sessions that ran down to zero. Skipped ones are not counted.
    pub completed_pomodoros: u64,
    pub total_focus_min: u64,
    pub total_break_min: u64,
}

/// SQLite database in the data directory.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/pomotimer/pomotimer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        Self::open_at(&data_dir()?.join("pomotimer.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    /// Open the database in the data directory, or an in-memory one when the
    /// file is unusable. Nothing written to the fallback survives the process.
    ///
    /// # Errors
    /// Returns an error only if the in-memory database cannot be created.
    pub fn open_or_memory() -> Result<Self, CoreError> {
        Self::or_memory(Self::open())
    }

    pub fn open_at_or_memory(path: &Path) -> Result<Self, CoreError> {
        Self::or_memory(Self::open_at(path))
    }

    fn or_memory(opened: Result<Self, CoreError>) -> Result<Self, CoreError> {
        opened.or_else(|e| {
            warn!(error = %e, "database unusable, keeping data in memory");
            Self::open_memory()
        })
    }

    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                session_type  TEXT NOT NULL,
                duration_secs INTEGER NOT NULL,
                skipped       INTEGER NOT NULL DEFAULT 0,
                completed_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Record a completed session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_session(
        &self,
        session_type: SessionType,
        duration_secs: u32,
        skipped: bool,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO sessions (session_type, duration_secs, skipped, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                session_type.as_str(),
                duration_secs,
                skipped,
                completed_at.to_rfc3339()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent sessions first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_type, duration_secs, skipped, completed_at
             FROM sessions
             ORDER BY completed_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, session_type, duration_secs, skipped, completed_at) = row?;
            // Rows written by an unknown version are skipped rather than failing the query.
            let (Ok(session_type), Ok(completed_at)) = (
                session_type.parse::<SessionType>(),
                DateTime::parse_from_rfc3339(&completed_at),
            ) else {
                continue;
            };
            records.push(SessionRecord {
                id,
                session_type,
                duration_secs,
                skipped,
                completed_at: completed_at.with_timezone(&Utc),
            });
        }
        Ok(records)
    }

    /// Stats since local midnight.
    pub fn stats_today(&self) -> Result<Stats, rusqlite::Error> {
        self.stats_since(Some(&local_midnight().to_rfc3339()))
    }

    pub fn stats_all(&self) -> Result<Stats, rusqlite::Error> {
        self.stats_since(None)
    }

    fn stats_since(&self, since: Option<&str>) -> Result<Stats, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT session_type, COUNT(*), COALESCE(SUM(skipped = 0), 0),
                    COALESCE(SUM(duration_secs), 0)
             FROM sessions
             WHERE ?1 IS NULL OR completed_at >= ?1
             GROUP BY session_type",
        )?;

        let mut stats = Stats::default();
        let rows = stmt.query_map(params![since], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, u64>(3)?,
            ))
        })?;

        for row in rows {
            let (session_type, count, full, secs) = row?;
            stats.total_sessions += count;
            match session_type.parse::<SessionType>() {
                Ok(SessionType::Focus) => {
                    stats.completed_pomodoros += full;
                    stats.total_focus_min += secs / 60;
                }
                Ok(_) => stats.total_break_min += secs / 60,
                Err(_) => {}
            }
        }
        Ok(stats)
    }
}

/// Start of the current local day, in UTC.
fn local_midnight() -> DateTime<Utc> {
    Local::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .map(|midnight| midnight.with_timezone(&Utc))
        // Midnight skipped by a DST change.
        .unwrap_or_else(|| Utc::now() - Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn record_and_query() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_session(SessionType::Focus, 1500, false, now).unwrap();
        db.record_session(SessionType::ShortBreak, 300, false, now).unwrap();
        db.record_session(SessionType::Focus, 1500, false, now).unwrap();

        let stats = db.stats_all().unwrap();
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.completed_pomodoros, 2);
        assert_eq!(stats.total_focus_min, 50);
        assert_eq!(stats.total_break_min, 5);
        assert_eq!(db.stats_today().unwrap(), stats);
    }

    #[test]
    fn stats_today_excludes_older_sessions() {
        let db = Database::open_memory().unwrap();
        let long_ago = Utc::now() - Duration::days(3);
        db.record_session(SessionType::Focus, 1500, false, long_ago).unwrap();
        assert_eq!(db.stats_today().unwrap().completed_pomodoros, 0);
        assert_eq!(db.stats_all().unwrap().completed_pomodoros, 1);
    }

    #[test]
    fn recent_sessions_are_newest_first() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_session(SessionType::Focus, 1500, false, now - Duration::minutes(30))
            .unwrap();
        db.record_session(SessionType::LongBreak, 900, false, now).unwrap();

        let recent = db.recent_sessions(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].session_type, SessionType::LongBreak);
        assert_eq!(recent[1].duration_secs, 1500);
    }

    #[test]
    fn skipped_focus_counts_minutes_but_not_pomodoros() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_session(SessionType::Focus, 1500, false, now).unwrap();
        db.record_session(SessionType::Focus, 600, true, now).unwrap();

        let stats = db.stats_all().unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.completed_pomodoros, 1);
        assert_eq!(stats.total_focus_min, 35);
        assert!(db.recent_sessions(1).unwrap()[0].skipped);
    }

    #[test]
    fn today_starts_at_local_midnight() {
        let db = Database::open_memory().unwrap();
        let midnight = local_midnight();
        assert!(midnight <= Utc::now());
        db.record_session(SessionType::Focus, 1500, false, midnight - Duration::seconds(1))
            .unwrap();
        db.record_session(SessionType::Focus, 1500, false, midnight + Duration::milliseconds(1))
            .unwrap();
        assert_eq!(db.stats_today().unwrap().completed_pomodoros, 1);
        assert_eq!(db.stats_all().unwrap().completed_pomodoros, 2);
    }

    #[test]
    fn unusable_file_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pomotimer.db");
        std::fs::write(&path, vec![0xAB_u8; 4096]).unwrap();

        assert!(Database::open_at(&path).is_err());
        let db = Database::open_at_or_memory(&path).unwrap();
        db.kv_set("presets", "{}").unwrap();
        assert_eq!(db.kv_get("presets").unwrap().as_deref(), Some("{}"));
    }
}
