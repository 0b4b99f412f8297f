// src/application/controllers/controller_tests.rs
//
// End-to-end controller calls over a temporary database.
//
// INVARIANTS TESTED:
// - Creates answer 201, reads and writes 200
// - Domain and storage failures come back with their mapped status
// - The body serializes to the data itself or to the error object

#[cfg(test)]
mod controller_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rusqlite::Connection;

    use crate::application::controllers::*;
    use crate::application::dto::*;
    use crate::application::error_handling::ErrorType;
    use crate::application::state::AppState;
    use crate::config::Environment;
    use crate::db::connection::create_test_pool;
    use crate::domain::PurchaseType;
    use crate::resilience::{
        BreakerSettings, CircuitState, LogObserver, ResilienceExecutor, RetryPolicy,
    };

    fn state(pool: crate::db::ConnectionPool) -> AppState {
        AppState::with_executor(
            pool,
            Arc::new(ResilienceExecutor::default()),
            Environment::Development,
        )
    }

    fn create_book_dto(title: &str) -> CreateBookDto {
        CreateBookDto {
            title: title.to_string(),
            publisher: "Jose Olympio".to_string(),
            edition: 1,
            publication_year: "1938".to_string(),
        }
    }

    #[tokio::test]
    async fn test_book_crud_statuses() {
        let (pool, _dir) = create_test_pool(0);
        let state = state(pool);

        let created = create_book(&state, create_book_dto("Vidas Secas")).await;
        assert_eq!(created.status, 201);
        let id = created.data().unwrap().id;

        let updated = update_book(
            &state,
            UpdateBookDto {
                id,
                title: "Vidas Secas".to_string(),
                publisher: "Record".to_string(),
                edition: 2,
                publication_year: "1938".to_string(),
            },
        )
        .await;
        assert_eq!(updated.status, 200);

        let fetched = get_book(&state, id).await;
        assert_eq!(fetched.data().map(|b| b.publisher.as_str()), Some("Record"));

        assert_eq!(delete_book(&state, id).await.status, 200);
        assert_eq!(get_book(&state, id).await.status, 404);
        assert!(list_books(&state).await.data().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_create_is_400_with_messages() {
        let (pool, _dir) = create_test_pool(0);
        let state = state(pool);

        let response = create_author(
            &state,
            CreateAuthorDto {
                name: "   ".to_string(),
            },
        )
        .await;

        assert_eq!(response.status, 400);
        let error = response.error_body().unwrap();
        assert_eq!(error.error_type, ErrorType::Validation);
        assert!(error.details.as_deref().unwrap().contains("Author name"));
    }

    #[tokio::test]
    async fn test_duplicate_link_is_409() {
        let (pool, _dir) = create_test_pool(0);
        let state = state(pool);

        let book_id = create_book(&state, create_book_dto("Sao Bernardo"))
            .await
            .data()
            .unwrap()
            .id;
        let subject_id = create_subject(
            &state,
            CreateSubjectDto {
                description: "Romance".to_string(),
            },
        )
        .await
        .data()
        .unwrap()
        .id;

        let link = LinkBookSubjectDto {
            book_id,
            subject_id,
        };
        assert_eq!(create_book_subject(&state, link.clone()).await.status, 201);
        assert_eq!(create_book_subject(&state, link).await.status, 409);

        let fetched = get_book_subject(&state, book_id, subject_id).await;
        let dto = fetched.data().unwrap();
        assert_eq!(dto.subject.as_ref().map(|s| s.description.as_str()), Some("Romance"));
        assert_eq!(list_subjects_of_book(&state, book_id).await.data().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_link_sides_are_404() {
        let (pool, _dir) = create_test_pool(0);
        let state = state(pool);

        let response = create_book_author(
            &state,
            LinkBookAuthorDto {
                book_id: 1,
                author_id: 1,
            },
        )
        .await;
        assert_eq!(response.status, 404);
        assert_eq!(get_book_author(&state, 1, 1).await.status, 404);
        assert_eq!(delete_book_author(&state, 1, 1).await.status, 404);
    }

    #[tokio::test]
    async fn test_price_listing_by_book_and_type() {
        let (pool, _dir) = create_test_pool(0);
        let state = state(pool);
        let book_id = create_book(&state, create_book_dto("Angustia"))
            .await
            .data()
            .unwrap()
            .id;

        for (purchase_type, value) in [(PurchaseType::Counter, 40.0), (PurchaseType::Online, 35.0)] {
            let response = create_book_price(
                &state,
                CreateBookPriceDto {
                    book_id,
                    purchase_type,
                    value,
                },
            )
            .await;
            assert_eq!(response.status, 201);
        }

        let online = list_prices_by_book_and_type(&state, book_id, PurchaseType::Online, 1).await;
        let prices = online.data().unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].value, 35.0);
        assert_eq!(prices[0].book.as_ref().map(|b| b.id), Some(book_id));

        assert_eq!(
            list_prices_by_book_and_type(&state, book_id, PurchaseType::Online, 0)
                .await
                .status,
            400
        );
        assert_eq!(list_prices_by_book(&state, 999).await.status, 404);
    }

    #[tokio::test]
    async fn test_same_purchase_type_twice_is_409() {
        let (pool, _dir) = create_test_pool(0);
        let state = state(pool);
        let book_id = create_book(&state, create_book_dto("Caetes"))
            .await
            .data()
            .unwrap()
            .id;

        let dto = CreateBookPriceDto {
            book_id,
            purchase_type: PurchaseType::Event,
            value: 12.0,
        };
        assert_eq!(create_book_price(&state, dto.clone()).await.status, 201);

        let second = create_book_price(&state, dto).await;
        assert_eq!(second.status, 409);
        assert_eq!(second.error_body().unwrap().error_type, ErrorType::Conflict);
    }

    #[tokio::test]
    async fn test_body_serializes_untagged() {
        let (pool, _dir) = create_test_pool(0);
        let state = state(pool);

        let ok = serde_json::to_value(list_authors(&state).await).unwrap();
        assert_eq!(ok, serde_json::json!({ "status": 200, "body": [] }));

        let missing = serde_json::to_value(get_author(&state, 3).await).unwrap();
        assert_eq!(missing["status"], 404);
        assert_eq!(missing["body"]["error_type"], "not_found");
    }

    #[tokio::test]
    async fn test_status_reports_counts_and_breaker() {
        let (pool, _dir) = create_test_pool(0);
        let state = state(pool);
        create_book(&state, create_book_dto("Memorias do Carcere")).await;

        let response = get_status(&state).await;
        let status = response.data().unwrap();
        assert_eq!(status.circuit_state, CircuitState::Closed);
        assert_eq!(status.database.book_count, 1);
    }

    #[tokio::test]
    async fn test_locked_storage_is_503() {
        let (pool, dir) = create_test_pool(0);
        let executor = Arc::new(ResilienceExecutor::new(
            RetryPolicy::new(1, Duration::from_millis(1)),
            BreakerSettings {
                failure_threshold: 1,
                break_duration: Duration::from_secs(60),
            },
            Arc::new(LogObserver),
        ));
        let state = AppState::with_executor(pool, executor, Environment::Production);

        let blocker = Connection::open(dir.path().join("libraryhub-test.db")).unwrap();
        blocker.execute_batch("BEGIN EXCLUSIVE").unwrap();

        let response = create_book(&state, create_book_dto("Insonia")).await;
        assert_eq!(response.status, 503);
        let error = response.error_body().unwrap();
        assert_eq!(error.error_type, ErrorType::Unavailable);
        assert!(error.details.is_none());

        blocker.execute_batch("ROLLBACK").unwrap();
    }
}
