use once_cell::sync::Lazy;
use regex::Regex;

use super::entity::Book;
use crate::domain::{DomainResult, Operation, Violations};

static YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}$").expect("static year pattern"));

/// Validates all Book rules for the given operation
pub fn validate_book(book: &Book, operation: Operation) -> DomainResult<()> {
    let mut v = Violations::new();

    if operation == Operation::Insert {
        v.check(book.id == 0, "Book id must not be provided on insert");
    }

    if matches!(operation, Operation::Insert | Operation::Update) {
        v.text(&book.title, "Title", 40);
        v.text(&book.publisher, "Publisher", 40);
        v.check(book.edition > 0, "Edition must be greater than zero");
        v.check(
            YEAR_PATTERN.is_match(&book.publication_year),
            "Publication year must have exactly 4 digits",
        );
    }

    if matches!(operation, Operation::Update | Operation::Delete) {
        v.check(book.id > 0, "Book id must be greater than zero");
    }

    v.finish()
}

/// Invariants that must hold true for Book domain:
///
/// 1. Identity is assigned by storage, never by the caller
/// 2. Title and publisher are required, 40 chars max
/// 3. Edition is positive
/// 4. Publication year is exactly four digits
