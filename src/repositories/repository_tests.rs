// src/repositories/repository_tests.rs
//
// Repository and unit-of-work behaviour against a real SQLite file.
//
// INVARIANTS TESTED:
// - Scalar and composite keys round-trip through add / get_by_id / delete
// - Paging is 1-based and stable
// - Repositories of one unit of work see each other's changes
// - Re-attaching a different copy of a tracked entity needs a detach
// - A failing flush commits nothing
// - A write the database rejects does not linger in the unit
// - Storage outages are retried, then short-circuited by the breaker

#[cfg(test)]
mod repository_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rusqlite::Connection;

    use crate::db::connection::create_test_pool;
    use crate::db::ConnectionPool;
    use crate::domain::{
        Author, Book, BookAuthor, BookAuthorKey, BookPrice, BookSubject, BookSubjectKey,
        PurchaseType, Subject,
    };
    use crate::error::AppError;
    use crate::repositories::{
        BaseRepository, BookAuthorColumn, BookAuthorInclude, BookColumn, BookPriceColumn,
        BookPriceInclude, BookSubjectInclude, Predicate, QueryOptions, QueryRepository,
        UnitOfWork,
    };
    use crate::resilience::{CircuitState, ResilienceError, ResilienceExecutor};

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn executor() -> Arc<ResilienceExecutor> {
        Arc::new(ResilienceExecutor::default())
    }

    async fn unit(pool: &ConnectionPool, executor: &Arc<ResilienceExecutor>) -> UnitOfWork {
        UnitOfWork::begin(pool, executor.clone()).await.unwrap()
    }

    fn book(title: &str) -> Book {
        Book::new(title, "Companhia das Letras", 1, "2004")
    }

    // ========================================================================
    // BASE REPOSITORY
    // ========================================================================

    #[tokio::test]
    async fn test_add_then_get_by_id_from_a_fresh_unit() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();

        let saved = unit(&pool, &exec).await.books().add(book("Vidas Secas")).await.unwrap();
        assert!(saved.id > 0);

        let found = unit(&pool, &exec)
            .await
            .books()
            .get_by_id(&saved.id)
            .await
            .unwrap();
        assert_eq!(found, Some(saved));
    }

    #[tokio::test]
    async fn test_composite_key_round_trip() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();
        let uow = unit(&pool, &exec).await;

        let b = uow.books().add(book("Grande Sertao")).await.unwrap();
        let a = uow.authors().add(Author::new("Guimaraes Rosa")).await.unwrap();
        let s = uow.subjects().add(Subject::new("Romance")).await.unwrap();

        uow.book_authors().add(BookAuthor::new(b.id, a.id)).await.unwrap();
        uow.book_subjects().add(BookSubject::new(b.id, s.id)).await.unwrap();

        let fresh = unit(&pool, &exec).await;
        let link = fresh
            .book_authors()
            .get_by_id(&BookAuthorKey::new(b.id, a.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(link.key(), BookAuthorKey::new(b.id, a.id));

        assert_eq!(
            fresh.book_authors().get_by_id(&BookAuthorKey::new(b.id, a.id + 1)).await.unwrap(),
            None
        );

        fresh.book_subjects().delete(BookSubject::new(b.id, s.id)).await.unwrap();
        assert_eq!(
            fresh
                .book_subjects()
                .get_by_id(&BookSubjectKey::new(b.id, s.id))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_update_overwrites_columns() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();

        let saved = unit(&pool, &exec).await.authors().add(Author::new("Clarice")).await.unwrap();

        let uow = unit(&pool, &exec).await;
        let mut renamed = saved.clone();
        renamed.name = "Clarice Lispector".to_string();
        uow.authors().update(renamed.clone()).await.unwrap();

        let all = unit(&pool, &exec).await.authors().get_all().await.unwrap();
        assert_eq!(all, vec![renamed]);
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_a_conflict_not_an_outage() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();
        let uow = unit(&pool, &exec).await;

        let mut ghost = book("Ghost");
        ghost.id = 404;

        let err = uow.books().update(ghost).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(exec.consecutive_failures(), 0);
        uow.session().lock().await.discard_changes();
    }

    #[tokio::test]
    async fn test_constraint_violation_is_not_retried() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();
        let uow = unit(&pool, &exec).await;

        // author 9 does not exist
        let err = uow.book_authors().add(BookAuthor::new(1, 9)).await.unwrap_err();
        assert!(err.is_constraint_violation());
        assert_eq!(exec.consecutive_failures(), 0);
        uow.session().lock().await.discard_changes();
    }

    // ========================================================================
    // UNIT OF WORK
    // ========================================================================

    #[tokio::test]
    async fn test_repositories_share_the_session() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();
        let uow = unit(&pool, &exec).await;

        let saved = uow.books().add(book("Capitaes da Areia")).await.unwrap();

        // staged by hand, not saved yet
        let mut edited = saved.clone();
        edited.edition = 3;
        {
            let mut session = uow.session().lock().await;
            session.detach::<Book>(&saved.id);
            session.update(edited.clone()).unwrap();
        }

        // another repository instance sees the staged change
        assert_eq!(uow.books().get_by_id(&saved.id).await.unwrap(), Some(edited.clone()));

        // another unit of work does not
        let other = unit(&pool, &exec).await;
        assert_eq!(other.books().get_by_id(&saved.id).await.unwrap(), Some(saved));

        assert_eq!(uow.save_changes().await.unwrap(), 1);
        let third = unit(&pool, &exec).await;
        assert_eq!(third.books().get_by_id(&edited.id).await.unwrap(), Some(edited));
    }

    #[tokio::test]
    async fn test_tracked_copy_must_be_detached_before_update() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();
        let saved = unit(&pool, &exec).await.books().add(book("Quincas Borba")).await.unwrap();

        let uow = unit(&pool, &exec).await;
        let loaded = uow.books().get_by_id(&saved.id).await.unwrap().unwrap();

        let mut edited = loaded.clone();
        edited.title = "Quincas Borba (ed.)".to_string();

        let err = uow.books().update(edited.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::TrackingConflict(_)));

        uow.session().lock().await.detach::<Book>(&loaded.id);
        uow.books().update(edited).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_save_changes_commits_nothing() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();
        let uow = unit(&pool, &exec).await;

        {
            let mut session = uow.session().lock().await;
            session.add(book("Sagarana")).unwrap();
            // invalid purchase for a book that does not exist
            session.add(BookPrice::new(999, PurchaseType::Counter, 10.0)).unwrap();
        }

        let err = uow.save_changes().await.unwrap_err();
        assert!(err.is_constraint_violation());

        uow.session().lock().await.discard_changes();
        let books = unit(&pool, &exec).await.books().get_all().await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_write_does_not_block_later_writes() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();
        let uow = unit(&pool, &exec).await;

        let saved = uow.books().add(book("Sertoes")).await.unwrap();
        uow.book_prices()
            .add(BookPrice::new(saved.id, PurchaseType::Online, 50.0))
            .await
            .unwrap();

        // one price per book and purchase type
        let err = uow
            .book_prices()
            .add(BookPrice::new(saved.id, PurchaseType::Online, 45.0))
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation());
        assert_eq!(uow.session().lock().await.pending_count(), 0);

        let author = uow.authors().add(Author::new("Euclides da Cunha")).await.unwrap();
        assert!(author.id > 0);
        assert_eq!(uow.save_changes().await.unwrap(), 0);
        assert_eq!(exec.consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn test_rejected_link_is_no_longer_tracked() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();
        let uow = unit(&pool, &exec).await;

        let saved = uow.books().add(book("Grande Sertao")).await.unwrap();
        // author 31 does not exist
        let err = uow
            .book_authors()
            .add(BookAuthor::new(saved.id, 31))
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation());

        let key = BookAuthorKey::new(saved.id, 31);
        assert_eq!(uow.book_authors().get_by_id(&key).await.unwrap(), None);

        let author = uow.authors().add(Author::new("Guimaraes Rosa")).await.unwrap();
        let link = uow
            .book_authors()
            .add(BookAuthor::new(saved.id, author.id))
            .await
            .unwrap();
        assert_eq!(link.author_id, author.id);
    }

    #[tokio::test]
    async fn test_abandoned_checkout_counts_as_a_failure() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();

        // drain the pool so the checkout blocks
        let held: Vec<_> = (0..pool.max_size()).map(|_| pool.get().unwrap()).collect();

        let result = UnitOfWork::begin_with_cancel(
            &pool,
            exec.clone(),
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::Resilience(ResilienceError::Cancelled(_)))
        ));
        assert_eq!(exec.consecutive_failures(), 1);
        assert_eq!(exec.circuit_state(), CircuitState::Closed);

        drop(held);
        assert!(UnitOfWork::begin(&pool, exec.clone()).await.is_ok());
        assert_eq!(exec.consecutive_failures(), 0);
    }

    // ========================================================================
    // CONDITIONAL QUERIES
    // ========================================================================

    #[tokio::test]
    async fn test_second_page_of_ten() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();
        let uow = unit(&pool, &exec).await;

        for i in 1..=25 {
            uow.books().add(book(&format!("Book {:02}", i))).await.unwrap();
        }

        let page = uow
            .books()
            .get_by_condition(QueryOptions::new().order_by(BookColumn::Id).page(10, 2))
            .await
            .unwrap();

        let ids: Vec<i64> = page.iter().map(|b| b.id).collect();
        assert_eq!(ids, (11..=20).collect::<Vec<_>>());

        let last = uow
            .books()
            .get_by_condition(QueryOptions::new().page(10, 3))
            .await
            .unwrap();
        assert_eq!(last.len(), 5);

        let err = uow
            .books()
            .get_by_condition(QueryOptions::new().page(10, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_filter_order_and_includes_on_composite_keys() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();
        let uow = unit(&pool, &exec).await;

        let b1 = uow.books().add(book("O Cortico")).await.unwrap();
        let b2 = uow.books().add(book("O Mulato")).await.unwrap();
        let mut authors = Vec::new();
        for name in ["Aluisio", "Azevedo", "Outro"] {
            authors.push(uow.authors().add(Author::new(name)).await.unwrap());
        }
        for a in &authors {
            uow.book_authors().add(BookAuthor::new(b1.id, a.id)).await.unwrap();
        }
        uow.book_authors().add(BookAuthor::new(b2.id, authors[0].id)).await.unwrap();

        let fresh = unit(&pool, &exec).await;
        let links = fresh
            .book_authors()
            .get_by_condition(
                QueryOptions::new()
                    .filter(Predicate::eq(BookAuthorColumn::BookId, b1.id))
                    .order_by(BookAuthorColumn::AuthorId)
                    .descending()
                    .include(BookAuthorInclude::Book)
                    .include(BookAuthorInclude::Author),
            )
            .await
            .unwrap();

        assert_eq!(links.len(), 3);
        assert_eq!(links[0].author_id, authors[2].id);
        assert!(links.iter().all(|l| l.book.as_ref() == Some(&b1)));
        assert_eq!(links[2].author.as_ref().map(|a| a.name.as_str()), Some("Aluisio"));

        // nothing linked to subjects yet
        let bare = fresh
            .book_subjects()
            .get_by_condition(QueryOptions::new().include(BookSubjectInclude::Subject))
            .await
            .unwrap();
        assert!(bare.is_empty());
    }

    #[tokio::test]
    async fn test_prices_by_book_and_type() {
        let (pool, _dir) = create_test_pool(0);
        let exec = executor();
        let uow = unit(&pool, &exec).await;

        let b = uow.books().add(book("Memorias Postumas")).await.unwrap();
        uow.book_prices().add(BookPrice::new(b.id, PurchaseType::Counter, 59.9)).await.unwrap();
        uow.book_prices().add(BookPrice::new(b.id, PurchaseType::Online, 49.9)).await.unwrap();

        let prices = uow
            .book_prices()
            .get_by_condition(
                QueryOptions::new()
                    .filter(
                        Predicate::eq(BookPriceColumn::BookId, b.id)
                            .and(Predicate::eq(BookPriceColumn::PurchaseType, PurchaseType::Online)),
                    )
                    .include(BookPriceInclude::Book)
                    .page(10, 1),
            )
            .await
            .unwrap();

        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].purchase_type, PurchaseType::Online);
        assert_eq!(prices[0].book.as_ref().map(|b| b.id), Some(b.id));
    }

    // ========================================================================
    // RESILIENCE
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_locked_database_opens_circuit_then_recovers() {
        let (pool, dir) = create_test_pool(0);
        let exec = executor();
        let uow = unit(&pool, &exec).await;

        let locker = Connection::open(dir.path().join("libraryhub-test.db")).unwrap();
        locker.execute_batch("BEGIN EXCLUSIVE").unwrap();

        // three busy failures with 2s and 4s backoff trip the breaker
        let err = uow.books().add(book("Triste Fim")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Resilience(ResilienceError::CircuitOpen { .. })
        ));
        assert!(err.is_unavailable());
        assert_eq!(uow.circuit_state(), CircuitState::Open);

        // fails fast while open; the staged insert is kept
        let err = uow.save_changes().await.unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(uow.session().lock().await.pending_count(), 1);

        locker.execute_batch("ROLLBACK").unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(uow.circuit_state(), CircuitState::HalfOpen);

        assert_eq!(uow.save_changes().await.unwrap(), 1);
        assert_eq!(uow.circuit_state(), CircuitState::Closed);
        assert_eq!(uow.books().get_all().await.unwrap().len(), 1);
    }
}
