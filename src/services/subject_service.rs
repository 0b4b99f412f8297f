// src/services/subject_service.rs
use std::sync::Arc;

use crate::domain::{validate_subject, DomainError, EntityKind, Operation, Subject};
use crate::error::AppResult;
use crate::repositories::{BaseRepository, UnitOfWork};

pub struct SubjectService {
    uow: Arc<UnitOfWork>,
}

impl SubjectService {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn add(&self, subject: Subject) -> AppResult<Subject> {
        validate_subject(&subject, Operation::Insert)?;
        let saved = self.uow.subjects().add(subject).await?;
        self.uow.save_changes().await?;
        Ok(saved)
    }

    pub async fn update(&self, subject: Subject) -> AppResult<Subject> {
        validate_subject(&subject, Operation::Update)?;
        if self.uow.subjects().get_by_id(&subject.id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Subject, subject.id).into());
        }
        self.uow.detach::<Subject>(&subject.id).await;

        self.uow.subjects().update(subject.clone()).await?;
        self.uow.save_changes().await?;
        Ok(subject)
    }

    pub async fn delete(&self, id: i64) -> AppResult<Subject> {
        let subject = self
            .uow
            .subjects()
            .get_by_id(&id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Subject, id))?;
        validate_subject(&subject, Operation::Delete)?;

        self.uow.subjects().delete(subject.clone()).await?;
        self.uow.save_changes().await?;
        Ok(subject)
    }

    pub async fn get_all(&self) -> AppResult<Vec<Subject>> {
        self.uow.subjects().get_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Subject>> {
        self.uow.subjects().get_by_id(&id).await
    }
}
