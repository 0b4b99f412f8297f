// src/services/author_service.rs
use std::sync::Arc;

use crate::domain::{validate_author, Author, DomainError, EntityKind, Operation};
use crate::error::AppResult;
use crate::repositories::{BaseRepository, UnitOfWork};

pub struct AuthorService {
    uow: Arc<UnitOfWork>,
}

impl AuthorService {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn add(&self, author: Author) -> AppResult<Author> {
        validate_author(&author, Operation::Insert)?;
        let saved = self.uow.authors().add(author).await?;
        self.uow.save_changes().await?;
        Ok(saved)
    }

    pub async fn update(&self, author: Author) -> AppResult<Author> {
        validate_author(&author, Operation::Update)?;
        self.ensure_exists(author.id).await?;

        self.uow.authors().update(author.clone()).await?;
        self.uow.save_changes().await?;
        Ok(author)
    }

    pub async fn delete(&self, id: i64) -> AppResult<Author> {
        let author = self
            .uow
            .authors()
            .get_by_id(&id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Author, id))?;
        validate_author(&author, Operation::Delete)?;

        self.uow.authors().delete(author.clone()).await?;
        self.uow.save_changes().await?;
        Ok(author)
    }

    pub async fn get_all(&self) -> AppResult<Vec<Author>> {
        self.uow.authors().get_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Author>> {
        self.uow.authors().get_by_id(&id).await
    }

    async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        if self.uow.authors().get_by_id(&id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Author, id).into());
        }
        self.uow.detach::<Author>(&id).await;
        Ok(())
    }
}
