// src/services/book_service.rs
use std::sync::Arc;

use log::info;

use crate::domain::{validate_book, Book, DomainError, EntityKind, Operation};
use crate::error::AppResult;
use crate::repositories::{BaseRepository, QueryOptions, QueryRepository, UnitOfWork};

pub struct BookService {
    uow: Arc<UnitOfWork>,
}

impl BookService {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn add(&self, book: Book) -> AppResult<Book> {
        validate_book(&book, Operation::Insert)?;

        let saved = self.uow.books().add(book).await?;
        self.uow.save_changes().await?;

        info!("event=book_created id={}", saved.id);
        Ok(saved)
    }

    pub async fn update(&self, book: Book) -> AppResult<Book> {
        validate_book(&book, Operation::Update)?;
        self.ensure_exists(book.id).await?;

        self.uow.books().update(book.clone()).await?;
        self.uow.save_changes().await?;
        Ok(book)
    }

    /// Delete by id; associations and prices go with it
    pub async fn delete(&self, id: i64) -> AppResult<Book> {
        let book = self
            .uow
            .books()
            .get_by_id(&id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Book, id))?;
        validate_book(&book, Operation::Delete)?;

        self.uow.books().delete(book.clone()).await?;
        self.uow.save_changes().await?;

        info!("event=book_deleted id={}", id);
        Ok(book)
    }

    pub async fn get_all(&self) -> AppResult<Vec<Book>> {
        self.uow.books().get_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        self.uow.books().get_by_id(&id).await
    }

    pub async fn get_by_condition(&self, options: QueryOptions<Book>) -> AppResult<Vec<Book>> {
        self.uow.books().get_by_condition(options).await
    }

    /// Loaded copy is detached so the caller's copy can be staged
    async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        if self.uow.books().get_by_id(&id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Book, id).into());
        }
        self.uow.detach::<Book>(&id).await;
        Ok(())
    }
}
