// src/db/sql.rs
//
// SQL text for the generic entity operations.
// Identifiers come from `Entity` constants, never from callers.

use crate::repositories::Entity;

/// Key columns followed by the other columns
pub(crate) fn column_list<E: Entity>() -> String {
    E::KEY_COLUMNS
        .iter()
        .chain(E::COLUMNS.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn select_all<E: Entity>() -> String {
    format!("SELECT {} FROM {}", column_list::<E>(), E::TABLE)
}

pub(crate) fn select_by_key<E: Entity>() -> String {
    format!(
        "{} WHERE {}",
        select_all::<E>(),
        key_predicate::<E>(1)
    )
}

/// `include_key` is false when storage assigns the key
pub(crate) fn insert<E: Entity>(include_key: bool) -> String {
    let columns: Vec<&str> = if include_key {
        E::KEY_COLUMNS.iter().chain(E::COLUMNS.iter()).copied().collect()
    } else {
        E::COLUMNS.to_vec()
    };

    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", E::TABLE);
    }

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::TABLE,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Parameters: column values, then key values
pub(crate) fn update<E: Entity>() -> String {
    let assignments = if E::COLUMNS.is_empty() {
        // key-only rows: a self-assignment still reports whether the row matched
        format!("{0} = {0}", E::KEY_COLUMNS[0])
    } else {
        E::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ?{}", c, i + 1))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "UPDATE {} SET {} WHERE {}",
        E::TABLE,
        assignments,
        key_predicate::<E>(E::COLUMNS.len() + 1)
    )
}

pub(crate) fn delete<E: Entity>() -> String {
    format!("DELETE FROM {} WHERE {}", E::TABLE, key_predicate::<E>(1))
}

fn key_predicate<E: Entity>(first_param: usize) -> String {
    E::KEY_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", c, first_param + i))
        .collect::<Vec<_>>()
        .join(" AND ")
}
