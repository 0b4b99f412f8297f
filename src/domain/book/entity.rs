use serde::{Deserialize, Serialize};

/// A catalogued book.
/// Root entity for authors, subjects and prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Generated by storage on insert; 0 until persisted
    pub id: i64,

    pub title: String,

    pub publisher: String,

    /// Edition number, starting at 1
    pub edition: i32,

    /// Four-digit year, kept as text like the catalogue cards
    pub publication_year: String,
}

impl Book {
    /// Create a new, not yet persisted book
    pub fn new(
        title: impl Into<String>,
        publisher: impl Into<String>,
        edition: i32,
        publication_year: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            publisher: publisher.into(),
            edition,
            publication_year: publication_year.into(),
        }
    }
}
