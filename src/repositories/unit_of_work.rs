// src/repositories/unit_of_work.rs
//
// One transaction boundary per logical operation.
//
// Every repository handed out shares this unit's session, so they see each
// other's changes. Only the executor is shared across units.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task;

use super::entity::Entity;
use super::repository::{run_resilient, SqliteRepository};
use crate::db::{
    get_connection, get_database_stats, verify_database_integrity, ConnectionPool, DatabaseStats,
    Session,
};
use crate::domain::{Author, Book, BookAuthor, BookPrice, BookSubject, Subject};
use crate::error::{AppError, AppResult};
use crate::resilience::{CircuitState, ResilienceExecutor};

pub struct UnitOfWork {
    session: Arc<Mutex<Session>>,
    executor: Arc<ResilienceExecutor>,
}

impl UnitOfWork {
    /// Check a connection out of the pool (through the executor) and open a session on it
    pub async fn begin(pool: &ConnectionPool, executor: Arc<ResilienceExecutor>) -> AppResult<Self> {
        Self::begin_with_cancel(pool, executor, std::future::pending()).await
    }

    /// Like [`begin`](Self::begin), but stops waiting once `cancel` resolves.
    ///
    /// The checkout runs on the blocking pool, since r2d2 blocks until a
    /// connection frees up. An abandoned checkout counts as a breaker failure.
    pub async fn begin_with_cancel<C>(
        pool: &ConnectionPool,
        executor: Arc<ResilienceExecutor>,
        cancel: C,
    ) -> AppResult<Self>
    where
        C: Future<Output = ()>,
    {
        let conn = executor
            .execute_with_cancel(cancel, || {
                let pool = pool.clone();
                async move {
                    task::spawn_blocking(move || get_connection(&pool))
                        .await
                        .map_err(|e| AppError::Other(format!("connection checkout failed: {}", e)))?
                }
            })
            .await?;

        Ok(Self {
            session: Arc::new(Mutex::new(Session::new(conn))),
            executor,
        })
    }

    fn repository<E: Entity>(&self) -> SqliteRepository<E> {
        SqliteRepository::new(self.session.clone(), self.executor.clone())
    }

    pub fn books(&self) -> SqliteRepository<Book> {
        self.repository()
    }

    pub fn authors(&self) -> SqliteRepository<Author> {
        self.repository()
    }

    pub fn subjects(&self) -> SqliteRepository<Subject> {
        self.repository()
    }

    pub fn book_authors(&self) -> SqliteRepository<BookAuthor> {
        self.repository()
    }

    pub fn book_subjects(&self) -> SqliteRepository<BookSubject> {
        self.repository()
    }

    pub fn book_prices(&self) -> SqliteRepository<BookPrice> {
        self.repository()
    }

    /// Flush every staged change in one transaction; returns affected rows
    pub async fn save_changes(&self) -> AppResult<usize> {
        run_resilient(&self.session, &self.executor, |session| session.save_changes()).await
    }

    /// Stop tracking `key` so a different copy can be staged for it
    pub async fn detach<E: Entity>(&self, key: &E::Key) -> bool {
        self.session.lock().await.detach::<E>(key)
    }

    /// Integrity check followed by table counts
    pub async fn database_stats(&self) -> AppResult<DatabaseStats> {
        run_resilient(&self.session, &self.executor, |session| {
            verify_database_integrity(session.connection())?;
            get_database_stats(session.connection())
        })
        .await
    }

    /// The raw session, for detaching entities or staging by hand
    pub fn session(&self) -> &Arc<Mutex<Session>> {
        &self.session
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.executor.circuit_state()
    }

    pub fn executor(&self) -> &Arc<ResilienceExecutor> {
        &self.executor
    }
}
