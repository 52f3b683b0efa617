//! Database schema migrations for SQLite.
//!
//! Each migration is a SQL batch that transforms the schema from version N
//! to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: variant caches and search position.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per (side, key); inserts overwrite
        CREATE TABLE variants (
            side TEXT NOT NULL,               -- 'real' or 'fake'
            match_key TEXT NOT NULL,          -- trailing hex of the digest
            variant TEXT NOT NULL,            -- rendered text, newline-terminated lines
            PRIMARY KEY (side, match_key)
        ) WITHOUT ROWID;

        -- Single-row table describing the search the caches belong to
        CREATE TABLE search_meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            real_fingerprint BLOB NOT NULL,   -- 32 bytes
            fake_fingerprint BLOB NOT NULL,   -- 32 bytes
            algorithm TEXT NOT NULL,
            scheme TEXT NOT NULL,
            num_chars INTEGER NOT NULL,
            next_attempt INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        "#,
    )?;

    Ok(())
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
