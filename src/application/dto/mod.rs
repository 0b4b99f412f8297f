// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are caller-facing shapes, separate from domain entities
// - Every conversion is an explicit `From` impl
// - Create DTOs never carry an id; update DTOs always do

use serde::{Deserialize, Serialize};

use crate::db::DatabaseStats;
use crate::domain::{Author, Book, BookAuthor, BookPrice, BookSubject, PurchaseType, Subject};
use crate::resilience::CircuitState;

// ============================================================================
// BOOK DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
    pub id: i64,
    pub title: String,
    pub publisher: String,
    pub edition: i32,
    pub publication_year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookDto {
    pub title: String,
    pub publisher: String,
    pub edition: i32,
    pub publication_year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBookDto {
    pub id: i64,
    pub title: String,
    pub publisher: String,
    pub edition: i32,
    pub publication_year: String,
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            publisher: book.publisher,
            edition: book.edition,
            publication_year: book.publication_year,
        }
    }
}

impl From<CreateBookDto> for Book {
    fn from(dto: CreateBookDto) -> Self {
        Book::new(dto.title, dto.publisher, dto.edition, dto.publication_year)
    }
}

impl From<UpdateBookDto> for Book {
    fn from(dto: UpdateBookDto) -> Self {
        Book {
            id: dto.id,
            title: dto.title,
            publisher: dto.publisher,
            edition: dto.edition,
            publication_year: dto.publication_year,
        }
    }
}

// ============================================================================
// AUTHOR / SUBJECT DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDto {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthorDto {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAuthorDto {
    pub id: i64,
    pub name: String,
}

impl From<Author> for AuthorDto {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            name: author.name,
        }
    }
}

impl From<CreateAuthorDto> for Author {
    fn from(dto: CreateAuthorDto) -> Self {
        Author::new(dto.name)
    }
}

impl From<UpdateAuthorDto> for Author {
    fn from(dto: UpdateAuthorDto) -> Self {
        Author {
            id: dto.id,
            name: dto.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectDto {
    pub id: i64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubjectDto {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubjectDto {
    pub id: i64,
    pub description: String,
}

impl From<Subject> for SubjectDto {
    fn from(subject: Subject) -> Self {
        Self {
            id: subject.id,
            description: subject.description,
        }
    }
}

impl From<CreateSubjectDto> for Subject {
    fn from(dto: CreateSubjectDto) -> Self {
        Subject::new(dto.description)
    }
}

impl From<UpdateSubjectDto> for Subject {
    fn from(dto: UpdateSubjectDto) -> Self {
        Subject {
            id: dto.id,
            description: dto.description,
        }
    }
}

// ============================================================================
// PRICE DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookPriceDto {
    pub id: i64,
    pub book_id: i64,
    pub purchase_type: PurchaseType,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<BookDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookPriceDto {
    pub book_id: i64,
    pub purchase_type: PurchaseType,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBookPriceDto {
    pub id: i64,
    pub book_id: i64,
    pub purchase_type: PurchaseType,
    pub value: f64,
}

impl From<BookPrice> for BookPriceDto {
    fn from(price: BookPrice) -> Self {
        Self {
            id: price.id,
            book_id: price.book_id,
            purchase_type: price.purchase_type,
            value: price.value,
            book: price.book.map(BookDto::from),
        }
    }
}

impl From<CreateBookPriceDto> for BookPrice {
    fn from(dto: CreateBookPriceDto) -> Self {
        BookPrice::new(dto.book_id, dto.purchase_type, dto.value)
    }
}

impl From<UpdateBookPriceDto> for BookPrice {
    fn from(dto: UpdateBookPriceDto) -> Self {
        BookPrice {
            id: dto.id,
            ..BookPrice::new(dto.book_id, dto.purchase_type, dto.value)
        }
    }
}

// ============================================================================
// LINK DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookAuthorDto {
    pub book_id: i64,
    pub author_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<BookDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorDto>,
}

/// Used for both create and update; a link has no other fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkBookAuthorDto {
    pub book_id: i64,
    pub author_id: i64,
}

impl From<BookAuthor> for BookAuthorDto {
    fn from(link: BookAuthor) -> Self {
        Self {
            book_id: link.book_id,
            author_id: link.author_id,
            book: link.book.map(BookDto::from),
            author: link.author.map(AuthorDto::from),
        }
    }
}

impl From<LinkBookAuthorDto> for BookAuthor {
    fn from(dto: LinkBookAuthorDto) -> Self {
        BookAuthor::new(dto.book_id, dto.author_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSubjectDto {
    pub book_id: i64,
    pub subject_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<BookDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<SubjectDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkBookSubjectDto {
    pub book_id: i64,
    pub subject_id: i64,
}

impl From<BookSubject> for BookSubjectDto {
    fn from(link: BookSubject) -> Self {
        Self {
            book_id: link.book_id,
            subject_id: link.subject_id,
            book: link.book.map(BookDto::from),
            subject: link.subject.map(SubjectDto::from),
        }
    }
}

impl From<LinkBookSubjectDto> for BookSubject {
    fn from(dto: LinkBookSubjectDto) -> Self {
        BookSubject::new(dto.book_id, dto.subject_id)
    }
}

// ============================================================================
// STATUS DTO
// ============================================================================

/// Health snapshot for operators
#[derive(Debug, Clone, Serialize)]
pub struct StatusDto {
    pub circuit_state: CircuitState,
    pub consecutive_failures: u32,
    pub database: DatabaseStats,
}
