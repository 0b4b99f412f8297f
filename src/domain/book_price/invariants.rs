use super::entity::BookPrice;
use crate::domain::{DomainResult, Operation, Violations};

/// Validates BookPrice rules for the given operation
pub fn validate_book_price(price: &BookPrice, operation: Operation) -> DomainResult<()> {
    let mut v = Violations::new();

    if matches!(operation, Operation::Insert | Operation::Update) {
        v.check(price.book_id > 0, "Book id must be greater than zero");
        v.check(
            price.value.is_finite() && price.value > 0.0,
            "Price value must be greater than zero",
        );
    }

    if matches!(operation, Operation::Update | Operation::Delete) {
        v.check(price.id > 0, "Price id must be greater than zero");
    }

    v.finish()
}
