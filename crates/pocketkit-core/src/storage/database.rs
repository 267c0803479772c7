//! SQLite-based storage.
//!
//! Provides persistent storage for:
//! - Completed breathing sessions and their statistics
//! - Key-value store for small pieces of application state
//!   (quick-access picks, phrase bookmarks, word of the day, account)
//!
//! Article bookmarks, the feed cache and scheduled notifications live in the
//! same database; their queries sit next to the types they store.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{data_dir, migrations};
use crate::breath::{BreathPattern, BreathSession};
use crate::error::{CoreError, DatabaseError, Result};

/// Aggregate numbers shown on the progress screen.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub total_sessions: u64,
    /// Sum of whole minutes per session.
    pub total_minutes: u64,
}

/// SQLite database shared by the three apps.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/pocketkit.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("pocketkit.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "database opened");
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Breathing sessions ───────────────────────────────────────────

    /// Append a finished breathing session.
    pub fn record_session(&self, session: &BreathSession) -> Result<()> {
        self.conn.execute(
            "INSERT INTO breath_sessions (id, routine_title, pattern, duration_secs, routine_color, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id.to_string(),
                session.routine_title,
                session.pattern.key(),
                session.duration_secs,
                session.routine_color,
                session.date.to_rfc3339(),
            ],
        )?;
        tracing::debug!(routine = %session.routine_title, secs = session.duration_secs, "session recorded");
        Ok(())
    }

    /// All sessions, oldest first.
    pub fn sessions(&self) -> Result<Vec<BreathSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, routine_title, pattern, duration_secs, routine_color, date
             FROM breath_sessions
             ORDER BY date ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, routine_title, pattern, duration_secs, routine_color, date) = row?;
            let pattern = pattern
                .parse::<BreathPattern>()
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            sessions.push(BreathSession {
                id: parse_uuid(&id)?,
                routine_title,
                date: parse_timestamp(&date)?,
                duration_secs,
                routine_color,
                pattern,
            });
        }
        Ok(sessions)
    }

    /// Session count and total whole minutes.
    pub fn session_stats(&self) -> Result<SessionStats> {
        let stats = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration_secs / 60), 0) FROM breath_sessions",
            [],
            |row| {
                Ok(SessionStats {
                    total_sessions: row.get(0)?,
                    total_minutes: row.get(1)?,
                })
            },
        )?;
        Ok(stats)
    }

    // ── Key-value state ──────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Read a JSON-encoded value. A value that no longer decodes is treated
    /// as absent.
    pub fn kv_get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.kv_get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, "discarding undecodable kv value: {e}");
                Ok(None)
            }
        }
    }

    /// Store a value as JSON.
    pub fn kv_set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.kv_set(key, &json)
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::Database(DatabaseError::QueryFailed(format!("bad timestamp '{raw}': {e}"))))
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| CoreError::Database(DatabaseError::QueryFailed(format!("bad id '{raw}': {e}"))))
}
