// src/domain/book_subject.rs
//
// Book <-> Subject association, keyed by (book_id, subject_id)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Book, DomainResult, Subject, Violations};

/// Composite identity of a book-subject link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookSubjectKey {
    pub book_id: i64,
    pub subject_id: i64,
}

impl BookSubjectKey {
    pub fn new(book_id: i64, subject_id: i64) -> Self {
        Self {
            book_id,
            subject_id,
        }
    }
}

impl fmt::Display for BookSubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(book {}, subject {})", self.book_id, self.subject_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSubject {
    pub book_id: i64,
    pub subject_id: i64,
    pub book: Option<Book>,
    pub subject: Option<Subject>,
}

impl BookSubject {
    pub fn new(book_id: i64, subject_id: i64) -> Self {
        Self {
            book_id,
            subject_id,
            book: None,
            subject: None,
        }
    }

    pub fn key(&self) -> BookSubjectKey {
        BookSubjectKey::new(self.book_id, self.subject_id)
    }
}

pub fn validate_book_subject(link: &BookSubject) -> DomainResult<()> {
    let mut v = Violations::new();
    v.check(link.book_id > 0, "Book id is required");
    v.check(link.subject_id > 0, "Subject id is required");
    v.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_keys_work_as_map_keys() {
        let mut seen = HashMap::new();
        seen.insert(BookSubjectKey::new(1, 9), "first");
        seen.insert(BookSubjectKey::new(1, 9), "second");
        seen.insert(BookSubjectKey::new(9, 1), "swapped");

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[&BookSubjectKey::new(1, 9)], "second");
    }
}
