// src/services/book_subject_service.rs
use std::sync::Arc;

use log::info;

use crate::domain::{
    validate_book_subject, BookSubject, BookSubjectKey, DomainError, EntityKind, Subject,
};
use crate::error::AppResult;
use crate::repositories::{
    BaseRepository, BookSubjectColumn, BookSubjectInclude, Predicate, QueryOptions,
    QueryRepository, UnitOfWork,
};

use super::book_author_service::LINK_PAGE_SIZE;

pub struct BookSubjectService {
    uow: Arc<UnitOfWork>,
}

impl BookSubjectService {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn add(&self, link: BookSubject) -> AppResult<BookSubject> {
        if self.uow.subjects().get_by_id(&link.subject_id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Subject, link.subject_id).into());
        }
        if self.uow.books().get_by_id(&link.book_id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Book, link.book_id).into());
        }
        validate_book_subject(&link)?;

        let key = link.key();
        if self.uow.book_subjects().get_by_id(&key).await?.is_some() {
            return Err(DomainError::already_exists(EntityKind::BookSubject, key).into());
        }

        let saved = self.uow.book_subjects().add(link).await?;
        self.uow.save_changes().await?;

        info!(
            "event=book_subject_linked book_id={} subject_id={}",
            key.book_id, key.subject_id
        );
        Ok(saved)
    }

    pub async fn update(&self, link: BookSubject) -> AppResult<BookSubject> {
        validate_book_subject(&link)?;
        self.ensure_exists(link.key()).await?;

        self.uow.book_subjects().update(link.clone()).await?;
        self.uow.save_changes().await?;
        Ok(link)
    }

    pub async fn delete(&self, key: BookSubjectKey) -> AppResult<BookSubject> {
        let link = self.ensure_exists(key).await?;
        validate_book_subject(&link)?;

        self.uow.book_subjects().delete(link.clone()).await?;
        self.uow.save_changes().await?;
        Ok(link)
    }

    pub async fn get_all(&self) -> AppResult<Vec<BookSubject>> {
        self.get_by_condition(
            QueryOptions::new()
                .include(BookSubjectInclude::Book)
                .include(BookSubjectInclude::Subject)
                .page(LINK_PAGE_SIZE, 1),
        )
        .await
    }

    pub async fn get_by_id(&self, key: BookSubjectKey) -> AppResult<Option<BookSubject>> {
        let links = self
            .get_by_condition(
                QueryOptions::new()
                    .filter(
                        Predicate::eq(BookSubjectColumn::BookId, key.book_id)
                            .and(Predicate::eq(BookSubjectColumn::SubjectId, key.subject_id)),
                    )
                    .include(BookSubjectInclude::Book)
                    .include(BookSubjectInclude::Subject),
            )
            .await?;
        Ok(links.into_iter().next())
    }

    pub async fn get_by_condition(
        &self,
        options: QueryOptions<BookSubject>,
    ) -> AppResult<Vec<BookSubject>> {
        self.uow.book_subjects().get_by_condition(options).await
    }

    pub async fn subjects_of(&self, book_id: i64) -> AppResult<Vec<Subject>> {
        let links = self
            .get_by_condition(
                QueryOptions::new()
                    .filter(Predicate::eq(BookSubjectColumn::BookId, book_id))
                    .order_by(BookSubjectColumn::SubjectId)
                    .include(BookSubjectInclude::Subject),
            )
            .await?;
        Ok(links.into_iter().filter_map(|link| link.subject).collect())
    }

    async fn ensure_exists(&self, key: BookSubjectKey) -> AppResult<BookSubject> {
        let link = self
            .uow
            .book_subjects()
            .get_by_id(&key)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::BookSubject, key))?;
        self.uow.detach::<BookSubject>(&key).await;
        Ok(link)
    }
}
