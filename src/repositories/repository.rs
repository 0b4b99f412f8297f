// src/repositories/repository.rs
//
// Generic repository over the shared session
//
// RULES:
// - Every call that reaches storage goes through the resilience executor
// - add / update / delete stage one write and flush at once
// - A write the database rejects is withdrawn; one kept back by an outage
//   stays staged for the next save_changes
// - Repositories never check existence; services do

use std::future::ready;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::entity::Entity;
use super::query::{QueryOptions, Queryable};
use crate::db::{Session, WriteId};
use crate::error::{AppError, AppResult};
use crate::resilience::ResilienceExecutor;

#[async_trait]
pub trait BaseRepository<E: Entity>: Send + Sync {
    /// Insert and flush; returns the entity as saved (generated key filled in)
    async fn add(&self, entity: E) -> AppResult<E>;

    /// Overwrite every column of the row with `entity`'s key and flush
    async fn update(&self, entity: E) -> AppResult<()>;

    async fn delete(&self, entity: E) -> AppResult<()>;

    async fn get_all(&self) -> AppResult<Vec<E>>;

    async fn get_by_id(&self, key: &E::Key) -> AppResult<Option<E>>;
}

#[async_trait]
pub trait QueryRepository<E: Queryable>: BaseRepository<E> {
    /// Filter, order, page, then eager-load the requested navigations
    async fn get_by_condition(&self, options: QueryOptions<E>) -> AppResult<Vec<E>>;
}

/// Run `op` against the session under the retry and breaker policies.
///
/// Only transient storage failures are retried and counted by the breaker;
/// any other error is handed back as is.
pub(crate) async fn run_resilient<T, F>(
    session: &Mutex<Session>,
    executor: &ResilienceExecutor,
    mut op: F,
) -> AppResult<T>
where
    T: Send,
    F: FnMut(&mut Session) -> AppResult<T> + Send,
{
    let mut session = session.lock().await;
    let outcome = executor
        .execute(|| {
            ready(match op(&mut *session) {
                Err(err) if err.is_transient() => Err(err),
                other => Ok(other),
            })
        })
        .await?;
    outcome
}

pub struct SqliteRepository<E> {
    session: Arc<Mutex<Session>>,
    executor: Arc<ResilienceExecutor>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> SqliteRepository<E> {
    pub fn new(session: Arc<Mutex<Session>>, executor: Arc<ResilienceExecutor>) -> Self {
        Self {
            session,
            executor,
            _entity: PhantomData,
        }
    }

    async fn run<T, F>(&self, op: F) -> AppResult<T>
    where
        T: Send,
        F: FnMut(&mut Session) -> AppResult<T> + Send,
    {
        run_resilient(&self.session, &self.executor, op).await
    }

    /// Flush the write staged as `staged`. When storage rejects it outright
    /// it is withdrawn, so later writes of this unit do not replay it.
    async fn flush(&self, staged: Option<WriteId>) -> AppResult<usize> {
        let result = self.run(|session| session.save_changes()).await;
        if let (Err(err), Some(staged)) = (&result, staged) {
            if !err.is_transient() && !err.is_unavailable() {
                self.session.lock().await.discard_write(staged);
            }
        }
        result
    }
}

#[async_trait]
impl<E: Entity> BaseRepository<E> for SqliteRepository<E> {
    async fn add(&self, entity: E) -> AppResult<E> {
        let (staged, pending) = {
            let mut session = self.session.lock().await;
            (session.next_write_id(), session.add(entity)?)
        };
        self.flush(Some(staged)).await?;
        pending.saved().ok_or_else(|| {
            AppError::Other(format!("{} insert was not applied by the flush", E::KIND))
        })
    }

    async fn update(&self, entity: E) -> AppResult<()> {
        let staged = {
            let mut session = self.session.lock().await;
            let staged = session.next_write_id();
            session.update(entity)?;
            staged
        };
        self.flush(Some(staged)).await?;
        Ok(())
    }

    async fn delete(&self, entity: E) -> AppResult<()> {
        let staged = {
            let mut session = self.session.lock().await;
            let staged = session.next_write_id();
            session.remove(entity)?;
            // an already staged delete is not staged again
            (session.next_write_id() != staged).then_some(staged)
        };
        self.flush(staged).await?;
        Ok(())
    }

    async fn get_all(&self) -> AppResult<Vec<E>> {
        self.run(|session| session.all::<E>()).await
    }

    async fn get_by_id(&self, key: &E::Key) -> AppResult<Option<E>> {
        self.run(|session| session.find::<E>(key)).await
    }
}

#[async_trait]
impl<E: Queryable> QueryRepository<E> for SqliteRepository<E> {
    async fn get_by_condition(&self, options: QueryOptions<E>) -> AppResult<Vec<E>> {
        let (sql, params) = options.to_sql()?;
        self.run(|session| {
            let mut rows = session.query::<E>(&sql, &params)?;
            for include in options.includes() {
                E::load_include(session, &mut rows, *include)?;
            }
            Ok(rows)
        })
        .await
    }
}
