// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO invariant enforcement
// - NO existence checks
// - Every storage call goes through the resilience executor

pub mod entity;
pub mod mappings;
pub mod query;
pub mod repository;
pub mod unit_of_work;

#[cfg(test)]
mod repository_tests;

pub use entity::{Entity, PrimaryKey};
pub use mappings::{
    BookAuthorColumn, BookAuthorInclude, BookColumn, BookPriceColumn, BookPriceInclude,
    BookSubjectColumn, BookSubjectInclude,
};
pub use query::{Column, CompareOp, NoInclude, Predicate, QueryOptions, Queryable};
pub use repository::{BaseRepository, QueryRepository, SqliteRepository};
pub use unit_of_work::UnitOfWork;
