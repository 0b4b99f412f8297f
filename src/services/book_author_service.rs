// src/services/book_author_service.rs
//
// Book <-> Author links
//
// Both sides must exist before a link is created. A link is identified by
// its (book_id, author_id) pair only.

use std::sync::Arc;

use log::info;

use crate::domain::{
    validate_book_author, Author, Book, BookAuthor, BookAuthorKey, DomainError, EntityKind,
};
use crate::error::AppResult;
use crate::repositories::{
    BaseRepository, BookAuthorColumn, BookAuthorInclude, Predicate, QueryOptions, QueryRepository,
    UnitOfWork,
};

/// First-page size of the link listing
pub const LINK_PAGE_SIZE: u32 = 10;

pub struct BookAuthorService {
    uow: Arc<UnitOfWork>,
}

impl BookAuthorService {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn add(&self, link: BookAuthor) -> AppResult<BookAuthor> {
        if self.uow.authors().get_by_id(&link.author_id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Author, link.author_id).into());
        }
        if self.uow.books().get_by_id(&link.book_id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Book, link.book_id).into());
        }
        validate_book_author(&link)?;

        let key = link.key();
        if self.uow.book_authors().get_by_id(&key).await?.is_some() {
            return Err(DomainError::already_exists(EntityKind::BookAuthor, key).into());
        }

        let saved = self.uow.book_authors().add(link).await?;
        self.uow.save_changes().await?;

        info!(
            "event=book_author_linked book_id={} author_id={}",
            key.book_id, key.author_id
        );
        Ok(saved)
    }

    pub async fn update(&self, link: BookAuthor) -> AppResult<BookAuthor> {
        validate_book_author(&link)?;
        self.ensure_exists(link.key()).await?;

        self.uow.book_authors().update(link.clone()).await?;
        self.uow.save_changes().await?;
        Ok(link)
    }

    pub async fn delete(&self, key: BookAuthorKey) -> AppResult<BookAuthor> {
        let link = self.ensure_exists(key).await?;
        validate_book_author(&link)?;

        self.uow.book_authors().delete(link.clone()).await?;
        self.uow.save_changes().await?;

        info!(
            "event=book_author_unlinked book_id={} author_id={}",
            key.book_id, key.author_id
        );
        Ok(link)
    }

    /// First page of links with book and author loaded
    pub async fn get_all(&self) -> AppResult<Vec<BookAuthor>> {
        self.get_by_condition(
            QueryOptions::new()
                .include(BookAuthorInclude::Book)
                .include(BookAuthorInclude::Author)
                .page(LINK_PAGE_SIZE, 1),
        )
        .await
    }

    pub async fn get_by_id(&self, key: BookAuthorKey) -> AppResult<Option<BookAuthor>> {
        let links = self
            .get_by_condition(
                QueryOptions::new()
                    .filter(
                        Predicate::eq(BookAuthorColumn::BookId, key.book_id)
                            .and(Predicate::eq(BookAuthorColumn::AuthorId, key.author_id)),
                    )
                    .include(BookAuthorInclude::Book)
                    .include(BookAuthorInclude::Author),
            )
            .await?;
        Ok(links.into_iter().next())
    }

    pub async fn get_by_condition(
        &self,
        options: QueryOptions<BookAuthor>,
    ) -> AppResult<Vec<BookAuthor>> {
        self.uow.book_authors().get_by_condition(options).await
    }

    /// Authors of one book
    pub async fn authors_of(&self, book_id: i64) -> AppResult<Vec<Author>> {
        let links = self
            .get_by_condition(
                QueryOptions::new()
                    .filter(Predicate::eq(BookAuthorColumn::BookId, book_id))
                    .order_by(BookAuthorColumn::AuthorId)
                    .include(BookAuthorInclude::Author),
            )
            .await?;
        Ok(links.into_iter().filter_map(|link| link.author).collect())
    }

    /// Books written by one author
    pub async fn books_of(&self, author_id: i64) -> AppResult<Vec<Book>> {
        let links = self
            .get_by_condition(
                QueryOptions::new()
                    .filter(Predicate::eq(BookAuthorColumn::AuthorId, author_id))
                    .order_by(BookAuthorColumn::BookId)
                    .include(BookAuthorInclude::Book),
            )
            .await?;
        Ok(links.into_iter().filter_map(|link| link.book).collect())
    }

    async fn ensure_exists(&self, key: BookAuthorKey) -> AppResult<BookAuthor> {
        let link = self
            .uow
            .book_authors()
            .get_by_id(&key)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::BookAuthor, key))?;
        self.uow.detach::<BookAuthor>(&key).await;
        Ok(link)
    }
}
