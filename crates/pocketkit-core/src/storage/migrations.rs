//! Database schema migrations for pocketkit.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!("failed to read schema_version: {e}");
        }
        0
    })
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: breathing history, article bookmarks and key-value state.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS breath_sessions (
            id            TEXT PRIMARY KEY,
            routine_title TEXT NOT NULL,
            pattern       TEXT NOT NULL,
            duration_secs INTEGER NOT NULL,
            routine_color TEXT NOT NULL DEFAULT '',
            date          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS article_bookmarks (
            id            TEXT PRIMARY KEY,
            hn_id         INTEGER NOT NULL,
            title         TEXT NOT NULL,
            summary       TEXT NOT NULL,
            content       TEXT NOT NULL,
            author        TEXT NOT NULL,
            publish_date  TEXT NOT NULL,
            image_url     TEXT,
            source_url    TEXT,
            category      TEXT NOT NULL,
            bookmarked_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_breath_sessions_date ON breath_sessions(date);
        CREATE INDEX IF NOT EXISTS idx_article_bookmarks_publish_date ON article_bookmarks(publish_date);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: feed cache and locally scheduled notifications.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS article_cache (
            feed       TEXT PRIMARY KEY,
            articles   TEXT NOT NULL,
            fetched_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS notifications (
            id         TEXT PRIMARY KEY,
            app        TEXT NOT NULL,
            title      TEXT NOT NULL,
            body       TEXT NOT NULL,
            trigger    TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_app ON notifications(app);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}
