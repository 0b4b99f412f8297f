// src/domain/book_author.rs
//
// Book <-> Author association
//
// CRITICAL INVARIANTS:
// - Identity is the (book_id, author_id) pair, never a surrogate id
// - A pair appears at most once
// - Both sides must exist before the pair is created (checked by the service)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Author, Book, DomainResult, Violations};

/// Composite identity of a book-author link.
///
/// Equality and hashing are structural over `(book_id, author_id)`, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookAuthorKey {
    pub book_id: i64,
    pub author_id: i64,
}

impl BookAuthorKey {
    pub fn new(book_id: i64, author_id: i64) -> Self {
        Self { book_id, author_id }
    }
}

impl fmt::Display for BookAuthorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(book {}, author {})", self.book_id, self.author_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookAuthor {
    pub book_id: i64,
    pub author_id: i64,

    /// Loaded only when eagerly included
    pub book: Option<Book>,

    /// Loaded only when eagerly included
    pub author: Option<Author>,
}

impl BookAuthor {
    pub fn new(book_id: i64, author_id: i64) -> Self {
        Self {
            book_id,
            author_id,
            book: None,
            author: None,
        }
    }

    pub fn key(&self) -> BookAuthorKey {
        BookAuthorKey::new(self.book_id, self.author_id)
    }
}

pub fn validate_book_author(link: &BookAuthor) -> DomainResult<()> {
    let mut v = Violations::new();
    v.check(link.book_id > 0, "Book id is required");
    v.check(link.author_id > 0, "Author id is required");
    v.finish()
}
