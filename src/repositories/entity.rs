// src/repositories/entity.rs
//
// Table mapping contracts
//
// An Entity knows its table, its key columns and how to move itself in and
// out of a row. Everything generic (SQL text, change tracking, repositories)
// is written against these traits only.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use rusqlite::types::Value;
use rusqlite::Row;

use crate::domain::EntityKind;

/// Primary key of an entity, scalar or composite.
///
/// Equality and hashing are structural over the key components.
pub trait PrimaryKey: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {
    /// SQL parameters in key-column order
    fn values(&self) -> Vec<Value>;

    /// True for a key storage has not assigned yet
    fn is_unset(&self) -> bool {
        false
    }
}

impl PrimaryKey for i64 {
    fn values(&self) -> Vec<Value> {
        vec![Value::Integer(*self)]
    }

    fn is_unset(&self) -> bool {
        *self == 0
    }
}

pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Key: PrimaryKey;

    const KIND: EntityKind;
    const TABLE: &'static str;
    const KEY_COLUMNS: &'static [&'static str];
    /// Non-key columns, in the order `values` returns them
    const COLUMNS: &'static [&'static str];
    /// The single key column is assigned by storage when inserted unset
    const GENERATED_KEY: bool;

    fn key(&self) -> Self::Key;

    /// Decode a row carrying every key column and every column
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Non-key column values; navigations are never part of them
    fn values(&self) -> Vec<Value>;

    /// The entity with its storage-assigned key
    fn with_generated_key(self, id: i64) -> Self;
}
