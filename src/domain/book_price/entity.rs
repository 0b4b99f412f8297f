use serde::{Deserialize, Serialize};

use crate::domain::Book;

/// Price of a book for one purchase channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookPrice {
    pub id: i64,
    pub book_id: i64,
    pub purchase_type: PurchaseType,
    pub value: f64,

    /// Loaded only when eagerly included
    pub book: Option<Book>,
}

/// How the book is bought. Stored as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseType {
    Counter,
    Online,
    Event,
    SelfService,
}

impl BookPrice {
    pub fn new(book_id: i64, purchase_type: PurchaseType, value: f64) -> Self {
        Self {
            id: 0,
            book_id,
            purchase_type,
            value,
            book: None,
        }
    }
}

impl PurchaseType {
    pub fn code(self) -> i64 {
        match self {
            PurchaseType::Counter => 1,
            PurchaseType::Online => 2,
            PurchaseType::Event => 3,
            PurchaseType::SelfService => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(PurchaseType::Counter),
            2 => Some(PurchaseType::Online),
            3 => Some(PurchaseType::Event),
            4 => Some(PurchaseType::SelfService),
            _ => None,
        }
    }
}

impl std::fmt::Display for PurchaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PurchaseType::Counter => write!(f, "counter"),
            PurchaseType::Online => write!(f, "online"),
            PurchaseType::Event => write!(f, "event"),
            PurchaseType::SelfService => write!(f, "self_service"),
        }
    }
}

impl std::str::FromStr for PurchaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counter" => Ok(PurchaseType::Counter),
            "online" => Ok(PurchaseType::Online),
            "event" => Ok(PurchaseType::Event),
            "self_service" => Ok(PurchaseType::SelfService),
            other => Err(format!("Invalid purchase type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        for t in [
            PurchaseType::Counter,
            PurchaseType::Online,
            PurchaseType::Event,
            PurchaseType::SelfService,
        ] {
            assert_eq!(PurchaseType::from_code(t.code()), Some(t));
            assert_eq!(t.to_string().parse::<PurchaseType>(), Ok(t));
        }
        assert_eq!(PurchaseType::from_code(0), None);
    }
}
