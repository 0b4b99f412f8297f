// src/db/mod.rs
//
// Database module
//
// Provides:
// - Connection pooling
// - Schema migrations
// - The storage session (change tracking, atomic flush)

pub mod connection;
pub mod migrations;
pub mod session;
pub(crate) mod sql;

pub use connection::{
    create_connection_pool, get_connection, get_database_path, ConnectionPool, PooledConn,
};

pub use migrations::{
    get_database_stats, initialize_database, verify_database_integrity, DatabaseStats,
};

pub use session::{EntryState, IdentityMap, PendingInsert, Session, TrackedEntry, WriteId};
