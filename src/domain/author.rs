// src/domain/author.rs
//
// Author Entity

use serde::{Deserialize, Serialize};

use crate::domain::{DomainResult, Operation, Violations};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }
}

/// Validates Author rules for the given operation
pub fn validate_author(author: &Author, operation: Operation) -> DomainResult<()> {
    let mut v = Violations::new();

    if matches!(operation, Operation::Insert | Operation::Update) {
        v.text(&author.name, "Author name", 40);
    }

    match operation {
        Operation::Insert => v.check(author.id == 0, "Author id must not be provided on insert"),
        Operation::Update => v.check(author.id > 0, "Author id is required on update"),
        Operation::Delete => v.check(author.id > 0, "Author id is required on delete"),
    }

    v.finish()
}
