// src/repositories/mappings.rs
//
// Table mappings for every entity
//
// Column lists here must match schema.sql. Navigations (book, author,
// subject) are never columns; they are filled by eager loading.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::Row;

use super::entity::{Entity, PrimaryKey};
use super::query::{Column, NoInclude, Queryable};
use crate::db::Session;
use crate::domain::{
    Author, Book, BookAuthor, BookAuthorKey, BookPrice, BookSubject, BookSubjectKey, EntityKind,
    PurchaseType, Subject,
};
use crate::error::AppResult;

// ============================================================================
// KEYS
// ============================================================================

impl PrimaryKey for BookAuthorKey {
    fn values(&self) -> Vec<Value> {
        vec![Value::Integer(self.book_id), Value::Integer(self.author_id)]
    }
}

impl PrimaryKey for BookSubjectKey {
    fn values(&self) -> Vec<Value> {
        vec![Value::Integer(self.book_id), Value::Integer(self.subject_id)]
    }
}

impl ToSql for PurchaseType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for PurchaseType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_i64()?;
        PurchaseType::from_code(code).ok_or(FromSqlError::OutOfRange(code))
    }
}

impl From<PurchaseType> for Value {
    fn from(purchase_type: PurchaseType) -> Self {
        Value::Integer(purchase_type.code())
    }
}

// ============================================================================
// BOOK
// ============================================================================

impl Entity for Book {
    type Key = i64;

    const KIND: EntityKind = EntityKind::Book;
    const TABLE: &'static str = "books";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];
    const COLUMNS: &'static [&'static str] = &["title", "publisher", "edition", "publication_year"];
    const GENERATED_KEY: bool = true;

    fn key(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Book {
            id: row.get("id")?,
            title: row.get("title")?,
            publisher: row.get("publisher")?,
            edition: row.get("edition")?,
            publication_year: row.get("publication_year")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Text(self.publisher.clone()),
            Value::Integer(i64::from(self.edition)),
            Value::Text(self.publication_year.clone()),
        ]
    }

    fn with_generated_key(self, id: i64) -> Self {
        Book { id, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookColumn {
    Id,
    Title,
    Publisher,
    Edition,
    PublicationYear,
}

impl Column for BookColumn {
    fn name(self) -> &'static str {
        match self {
            BookColumn::Id => "id",
            BookColumn::Title => "title",
            BookColumn::Publisher => "publisher",
            BookColumn::Edition => "edition",
            BookColumn::PublicationYear => "publication_year",
        }
    }
}

impl Queryable for Book {
    type Column = BookColumn;
    type Include = NoInclude;

    fn load_include(_: &mut Session, _: &mut [Self], include: NoInclude) -> AppResult<()> {
        match include {}
    }
}

// ============================================================================
// AUTHOR / SUBJECT
// ============================================================================

impl Entity for Author {
    type Key = i64;

    const KIND: EntityKind = EntityKind::Author;
    const TABLE: &'static str = "authors";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];
    const COLUMNS: &'static [&'static str] = &["name"];
    const GENERATED_KEY: bool = true;

    fn key(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Author {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone())]
    }

    fn with_generated_key(self, id: i64) -> Self {
        Author { id, ..self }
    }
}

impl Entity for Subject {
    type Key = i64;

    const KIND: EntityKind = EntityKind::Subject;
    const TABLE: &'static str = "subjects";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];
    const COLUMNS: &'static [&'static str] = &["description"];
    const GENERATED_KEY: bool = true;

    fn key(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Subject {
            id: row.get("id")?,
            description: row.get("description")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.description.clone())]
    }

    fn with_generated_key(self, id: i64) -> Self {
        Subject { id, ..self }
    }
}

// ============================================================================
// BOOK PRICE
// ============================================================================

impl Entity for BookPrice {
    type Key = i64;

    const KIND: EntityKind = EntityKind::BookPrice;
    const TABLE: &'static str = "book_prices";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];
    const COLUMNS: &'static [&'static str] = &["book_id", "purchase_type", "value"];
    const GENERATED_KEY: bool = true;

    fn key(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(BookPrice {
            id: row.get("id")?,
            book_id: row.get("book_id")?,
            purchase_type: row.get("purchase_type")?,
            value: row.get("value")?,
            book: None,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.book_id),
            Value::from(self.purchase_type),
            Value::Real(self.value),
        ]
    }

    fn with_generated_key(self, id: i64) -> Self {
        BookPrice { id, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookPriceColumn {
    Id,
    BookId,
    PurchaseType,
    Value,
}

impl Column for BookPriceColumn {
    fn name(self) -> &'static str {
        match self {
            BookPriceColumn::Id => "id",
            BookPriceColumn::BookId => "book_id",
            BookPriceColumn::PurchaseType => "purchase_type",
            BookPriceColumn::Value => "value",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookPriceInclude {
    Book,
}

impl Queryable for BookPrice {
    type Column = BookPriceColumn;
    type Include = BookPriceInclude;

    fn load_include(
        session: &mut Session,
        rows: &mut [Self],
        include: BookPriceInclude,
    ) -> AppResult<()> {
        match include {
            BookPriceInclude::Book => {
                for price in rows.iter_mut() {
                    price.book = session.find::<Book>(&price.book_id)?;
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// ASSOCIATIONS (composite keys)
// ============================================================================

impl Entity for BookAuthor {
    type Key = BookAuthorKey;

    const KIND: EntityKind = EntityKind::BookAuthor;
    const TABLE: &'static str = "book_authors";
    const KEY_COLUMNS: &'static [&'static str] = &["book_id", "author_id"];
    const COLUMNS: &'static [&'static str] = &[];
    const GENERATED_KEY: bool = false;

    fn key(&self) -> BookAuthorKey {
        BookAuthor::key(self)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(BookAuthor::new(row.get("book_id")?, row.get("author_id")?))
    }

    fn values(&self) -> Vec<Value> {
        Vec::new()
    }

    fn with_generated_key(self, _: i64) -> Self {
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookAuthorColumn {
    BookId,
    AuthorId,
}

impl Column for BookAuthorColumn {
    fn name(self) -> &'static str {
        match self {
            BookAuthorColumn::BookId => "book_id",
            BookAuthorColumn::AuthorId => "author_id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookAuthorInclude {
    Book,
    Author,
}

impl Queryable for BookAuthor {
    type Column = BookAuthorColumn;
    type Include = BookAuthorInclude;

    fn load_include(
        session: &mut Session,
        rows: &mut [Self],
        include: BookAuthorInclude,
    ) -> AppResult<()> {
        for link in rows.iter_mut() {
            match include {
                BookAuthorInclude::Book => link.book = session.find::<Book>(&link.book_id)?,
                BookAuthorInclude::Author => link.author = session.find::<Author>(&link.author_id)?,
            }
        }
        Ok(())
    }
}

impl Entity for BookSubject {
    type Key = BookSubjectKey;

    const KIND: EntityKind = EntityKind::BookSubject;
    const TABLE: &'static str = "book_subjects";
    const KEY_COLUMNS: &'static [&'static str] = &["book_id", "subject_id"];
    const COLUMNS: &'static [&'static str] = &[];
    const GENERATED_KEY: bool = false;

    fn key(&self) -> BookSubjectKey {
        BookSubject::key(self)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(BookSubject::new(row.get("book_id")?, row.get("subject_id")?))
    }

    fn values(&self) -> Vec<Value> {
        Vec::new()
    }

    fn with_generated_key(self, _: i64) -> Self {
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSubjectColumn {
    BookId,
    SubjectId,
}

impl Column for BookSubjectColumn {
    fn name(self) -> &'static str {
        match self {
            BookSubjectColumn::BookId => "book_id",
            BookSubjectColumn::SubjectId => "subject_id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSubjectInclude {
    Book,
    Subject,
}

impl Queryable for BookSubject {
    type Column = BookSubjectColumn;
    type Include = BookSubjectInclude;

    fn load_include(
        session: &mut Session,
        rows: &mut [Self],
        include: BookSubjectInclude,
    ) -> AppResult<()> {
        for link in rows.iter_mut() {
            match include {
                BookSubjectInclude::Book => link.book = session.find::<Book>(&link.book_id)?,
                BookSubjectInclude::Subject => {
                    link.subject = session.find::<Subject>(&link.subject_id)?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::create_test_connection;

    #[test]
    fn test_composite_key_values_follow_column_order() {
        let key = BookAuthorKey::new(3, 9);
        assert_eq!(key.values(), vec![Value::Integer(3), Value::Integer(9)]);
        assert_eq!(BookAuthor::KEY_COLUMNS, &["book_id", "author_id"]);
    }

    #[test]
    fn test_purchase_type_sql_round_trip() {
        let conn = create_test_connection().unwrap();
        let back: PurchaseType = conn
            .query_row("SELECT ?1", [PurchaseType::SelfService], |row| row.get(0))
            .unwrap();
        assert_eq!(back, PurchaseType::SelfService);

        let bad: rusqlite::Result<PurchaseType> = conn.query_row("SELECT 9", [], |row| row.get(0));
        assert!(bad.is_err());
    }

    #[test]
    fn test_values_exclude_key_and_navigations() {
        let mut price = BookPrice::new(4, PurchaseType::Online, 39.9);
        price.id = 12;
        price.book = Some(Book::new("T", "P", 1, "2000"));

        assert_eq!(
            price.values(),
            vec![Value::Integer(4), Value::Integer(2), Value::Real(39.9)]
        );
        assert_eq!(price.clone().with_generated_key(30).id, 30);
    }
}
