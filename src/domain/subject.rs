// src/domain/subject.rs
//
// Subject Entity

use serde::{Deserialize, Serialize};

use crate::domain::{DomainResult, Operation, Violations};

/// A catalogue subject (genre, topic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub description: String,
}

impl Subject {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: 0,
            description: description.into(),
        }
    }
}

pub fn validate_subject(subject: &Subject, operation: Operation) -> DomainResult<()> {
    let mut v = Violations::new();

    if matches!(operation, Operation::Insert | Operation::Update) {
        v.text(&subject.description, "Subject description", 20);
    }

    match operation {
        Operation::Insert => v.check(subject.id == 0, "Subject id must not be provided on insert"),
        Operation::Update => v.check(subject.id > 0, "Subject id is required on update"),
        Operation::Delete => v.check(subject.id > 0, "Subject id is required on delete"),
    }

    v.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_limit_is_twenty() {
        assert!(validate_subject(&Subject::new("x".repeat(20)), Operation::Insert).is_ok());
        assert!(validate_subject(&Subject::new("x".repeat(21)), Operation::Insert).is_err());
    }
}
