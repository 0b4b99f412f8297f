// src/lib.rs
// LibraryHub - Library catalogue: books, authors, subjects and prices
//
// Architecture:
// - Domain-centric: validation rules live with the entities
// - Services: existence checks and orchestration over one unit of work
// - Repositories: dumb data mappers sharing a tracked session
// - Resilience: every storage call goes through retry + circuit breaker
// - Application Layer: DTOs, controllers and the error → status boundary

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod logging;
pub mod repositories;
pub mod resilience;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    validate_author,
    validate_book,
    validate_book_author,
    validate_book_price,
    validate_book_subject,
    validate_subject,
    Author,
    Book,
    BookAuthor,
    BookAuthorKey,
    BookPrice,
    BookSubject,
    BookSubjectKey,
    DomainError,
    EntityKind,
    Operation,
    PurchaseType,
    Subject,
};

// ============================================================================
// PUBLIC API - Errors and configuration
// ============================================================================

pub use config::{AppConfig, Environment};
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool, Session};

// ============================================================================
// PUBLIC API - Repositories and resilience
// ============================================================================

pub use repositories::{
    BaseRepository, Predicate, QueryOptions, QueryRepository, SqliteRepository, UnitOfWork,
};
pub use resilience::{CircuitState, ResilienceError, ResilienceExecutor};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    AuthorService, BookAuthorService, BookPriceService, BookService, BookSubjectService,
    SubjectService,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{ApiResponse, AppState, ErrorResponse};

pub use application::controllers;
pub use application::dto;
