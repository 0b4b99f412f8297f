// src/db/migrations.rs
//
// Schema versioning
//
// PRINCIPLES:
// - Migrations are an ordered, append-only list
// - Each migration runs in its own transaction together with its version row
// - A database newer than this binary is refused, never downgraded
// - Safe to call on every start

use rusqlite::Connection;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// `(version, sql)` pairs, ascending. Never edit a released entry; append a new one.
const MIGRATIONS: &[(i32, &str)] = &[(1, include_str!("../../schema.sql"))];

/// Highest version this binary knows how to produce
pub fn latest_schema_version() -> i32 {
    MIGRATIONS.last().map(|(version, _)| *version).unwrap_or(0)
}

/// Bring the schema up to `latest_schema_version()`.
pub fn initialize_database(conn: &Connection) -> AppResult<()> {
    let current = get_schema_version(conn)?;
    let latest = latest_schema_version();

    if current > latest {
        return Err(AppError::Other(format!(
            "Schema version {} is newer than supported {}. Update the application.",
            current, latest
        )));
    }

    for (version, sql) in MIGRATIONS.iter().filter(|(version, _)| *version > current) {
        apply_migration(conn, *version, sql)?;
        log::info!("event=schema_applied version={}", version);
    }

    Ok(())
}

/// 0 when the version table does not exist yet
fn get_schema_version(conn: &Connection) -> AppResult<i32> {
    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(version.unwrap_or(0))
}

fn apply_migration(conn: &Connection, version: i32, sql: &str) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(sql).map_err(|e| {
        AppError::Other(format!("Failed to apply schema version {}: {}", version, e))
    })?;
    tx.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        [version],
    )?;

    tx.commit()?;
    Ok(())
}

/// `PRAGMA integrity_check`; anything but "ok" is an error
pub fn verify_database_integrity(conn: &Connection) -> AppResult<()> {
    let result: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;

    if result != "ok" {
        return Err(AppError::Other(format!(
            "Database integrity check failed: {}",
            result
        )));
    }

    Ok(())
}

/// Size and row counts, for the status command
pub fn get_database_stats(conn: &Connection) -> AppResult<DatabaseStats> {
    let page_count: i64 = conn.query_row("PRAGMA page_count", [], |row| row.get(0))?;
    let page_size: i64 = conn.query_row("PRAGMA page_size", [], |row| row.get(0))?;

    let count = |table: &str| -> AppResult<i64> {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?)
    };

    Ok(DatabaseStats {
        size_bytes: page_count * page_size,
        page_count,
        page_size,
        book_count: count("books")?,
        author_count: count("authors")?,
        subject_count: count("subjects")?,
        price_count: count("book_prices")?,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    pub size_bytes: i64,
    pub page_count: i64,
    pub page_size: i64,
    pub book_count: i64,
    pub author_count: i64,
    pub subject_count: i64,
    pub price_count: i64,
}
