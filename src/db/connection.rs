// src/db/connection.rs
//
// Database connection management
//
// PRINCIPLES:
// - Explicit connection pooling
// - No hidden connection creation
// - Clear error propagation
// - Thread-safe access

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::PathBuf;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled connection
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Default database file path
///
/// Path structure: {APP_DATA}/libraryhub/libraryhub.db
pub fn get_database_path() -> AppResult<PathBuf> {
    let app_data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Other("Could not determine app data directory".to_string()))?;

    let libraryhub_dir = app_data_dir.join("libraryhub");

    std::fs::create_dir_all(&libraryhub_dir)?;

    Ok(libraryhub_dir.join("libraryhub.db"))
}

/// Create a connection pool
///
/// Every connection gets:
/// - Foreign keys enabled (cascading deletes rely on it)
/// - WAL journal mode
/// - The configured busy timeout
pub fn create_connection_pool(config: &DatabaseConfig) -> AppResult<ConnectionPool> {
    let db_path = match &config.path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            path.clone()
        }
        None => get_database_path()?,
    };

    let busy_timeout_ms = config.busy_timeout_ms;
    let manager = SqliteConnectionManager::file(&db_path).with_init(move |conn| {
        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = {};",
            busy_timeout_ms
        ))?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(config.pool_max_size)
        .build(manager)
        .map_err(|e| AppError::Pool(format!("Failed to create connection pool: {}", e)))?;

    log::info!(
        "event=pool_ready path={} max_size={}",
        db_path.display(),
        config.pool_max_size
    );

    Ok(pool)
}

/// Get a connection from the pool
pub fn get_connection(pool: &ConnectionPool) -> AppResult<PooledConn> {
    pool.get()
        .map_err(|e| AppError::Pool(format!("Failed to get database connection: {}", e)))
}

/// Create a standalone in-memory connection (for testing)
pub fn create_test_connection() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// File-backed pool with the schema applied, living as long as the returned directory.
///
/// In-memory databases are private to one connection, so pooled tests need a file.
#[cfg(test)]
pub(crate) fn create_test_pool(busy_timeout_ms: u64) -> (ConnectionPool, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        path: Some(dir.path().join("libraryhub-test.db")),
        pool_max_size: 4,
        busy_timeout_ms,
    };
    let pool = create_connection_pool(&config).unwrap();
    crate::db::initialize_database(&get_connection(&pool).unwrap()).unwrap();
    (pool, dir)
}
