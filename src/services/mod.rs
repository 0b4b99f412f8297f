// src/services/mod.rs
//
// Services Module - Domain rules over the unit of work
//
// Services validate, check existence, stage through repositories and save.
// They never touch SQL.

pub mod author_service;
pub mod book_author_service;
pub mod book_price_service;
pub mod book_service;
pub mod book_subject_service;
pub mod subject_service;


pub use author_service::AuthorService;
pub use book_author_service::{BookAuthorService, LINK_PAGE_SIZE};
pub use book_price_service::{BookPriceService, PRICE_PAGE_SIZE};
pub use book_service::BookService;
pub use book_subject_service::BookSubjectService;
pub use subject_service::SubjectService;
