// src/application/state.rs

use std::sync::Arc;

use crate::config::{AppConfig, Environment};
use crate::db::ConnectionPool;
use crate::error::AppResult;
use crate::repositories::UnitOfWork;
use crate::resilience::ResilienceExecutor;
use crate::services::{
    AuthorService, BookAuthorService, BookPriceService, BookService, BookSubjectService,
    SubjectService,
};

/// Process-wide state shared by every controller call.
/// The executor is the only piece of it that carries runtime state across calls.
#[derive(Clone)]
pub struct AppState {
    pub pool: ConnectionPool,
    pub executor: Arc<ResilienceExecutor>,
    pub environment: Environment,
}

impl AppState {
    pub fn new(pool: ConnectionPool, config: &AppConfig) -> Self {
        Self::with_executor(
            pool,
            Arc::new(ResilienceExecutor::from_config(&config.resilience)),
            config.environment,
        )
    }

    pub fn with_executor(
        pool: ConnectionPool,
        executor: Arc<ResilienceExecutor>,
        environment: Environment,
    ) -> Self {
        Self {
            pool,
            executor,
            environment,
        }
    }

    /// Fresh unit of work for one controller call
    pub async fn unit_of_work(&self) -> AppResult<Arc<UnitOfWork>> {
        let uow = UnitOfWork::begin(&self.pool, self.executor.clone()).await?;
        Ok(Arc::new(uow))
    }

    pub async fn books(&self) -> AppResult<BookService> {
        Ok(BookService::new(self.unit_of_work().await?))
    }

    pub async fn authors(&self) -> AppResult<AuthorService> {
        Ok(AuthorService::new(self.unit_of_work().await?))
    }

    pub async fn subjects(&self) -> AppResult<SubjectService> {
        Ok(SubjectService::new(self.unit_of_work().await?))
    }

    pub async fn book_prices(&self) -> AppResult<BookPriceService> {
        Ok(BookPriceService::new(self.unit_of_work().await?))
    }

    pub async fn book_authors(&self) -> AppResult<BookAuthorService> {
        Ok(BookAuthorService::new(self.unit_of_work().await?))
    }

    pub async fn book_subjects(&self) -> AppResult<BookSubjectService> {
        Ok(BookSubjectService::new(self.unit_of_work().await?))
    }
}
