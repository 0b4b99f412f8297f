pub mod entity;
pub mod invariants;

pub use entity::{BookPrice, PurchaseType};
pub use invariants::validate_book_price;
