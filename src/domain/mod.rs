// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file MUST declare all domain modules and re-export their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod author;
pub mod book;
pub mod book_author;
pub mod book_price;
pub mod book_subject;
pub mod subject;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Book Domain
pub use book::{validate_book, Book};

// Author Domain
pub use author::{validate_author, Author};

// Subject Domain
pub use subject::{validate_subject, Subject};

// Associations (composite keys)
pub use book_author::{validate_book_author, BookAuthor, BookAuthorKey};
pub use book_subject::{validate_book_subject, BookSubject, BookSubjectKey};

// Prices
pub use book_price::{validate_book_price, BookPrice, PurchaseType};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use std::fmt;
use thiserror::Error;

/// Which entity an error talks about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Book,
    Author,
    Subject,
    BookAuthor,
    BookSubject,
    BookPrice,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Book => write!(f, "Book"),
            EntityKind::Author => write!(f, "Author"),
            EntityKind::Subject => write!(f, "Subject"),
            EntityKind::BookAuthor => write!(f, "Book author"),
            EntityKind::BookSubject => write!(f, "Book subject"),
            EntityKind::BookPrice => write!(f, "Book price"),
        }
    }
}

/// The write operation a validation pass is checking for.
/// Rules differ per operation (e.g. ids must be unset on insert).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{kind} {key} not found")]
    NotFound { kind: EntityKind, key: String },

    #[error("{kind} {key} already exists")]
    AlreadyExists { kind: EntityKind, key: String },

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl DomainError {
    pub fn not_found(kind: EntityKind, key: impl fmt::Display) -> Self {
        DomainError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub fn already_exists(kind: EntityKind, key: impl fmt::Display) -> Self {
        DomainError::AlreadyExists {
            kind,
            key: key.to_string(),
        }
    }
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

/// Collects rule failures so a single validation pass reports all of them.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<String>);

impl Violations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn check(&mut self, ok: bool, message: &str) {
        if !ok {
            self.0.push(message.to_string());
        }
    }

    /// Non-blank and at most `max` characters.
    pub(crate) fn text(&mut self, value: &str, field: &str, max: usize) {
        if value.trim().is_empty() {
            self.0.push(format!("{field} is required"));
        } else if value.chars().count() > max {
            self.0.push(format!("{field} must be at most {max} characters"));
        }
    }

    pub(crate) fn finish(self) -> DomainResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.0))
        }
    }
}
