// src/application/controllers/book_controller.rs
//
// Book endpoints

use super::{ApiResponse, STATUS_CREATED, STATUS_OK};
use crate::application::dto::{BookDto, CreateBookDto, UpdateBookDto};
use crate::application::state::AppState;
use crate::domain::{DomainError, EntityKind};
use crate::error::AppResult;

/// List all books
pub async fn list_books(state: &AppState) -> ApiResponse<Vec<BookDto>> {
    ApiResponse::from_result(list(state).await, STATUS_OK, state.environment)
}

/// Get a single book by id
pub async fn get_book(state: &AppState, id: i64) -> ApiResponse<BookDto> {
    ApiResponse::from_result(get(state, id).await, STATUS_OK, state.environment)
}

/// Create a new book
pub async fn create_book(state: &AppState, dto: CreateBookDto) -> ApiResponse<BookDto> {
    ApiResponse::from_result(create(state, dto).await, STATUS_CREATED, state.environment)
}

/// Replace an existing book
pub async fn update_book(state: &AppState, dto: UpdateBookDto) -> ApiResponse<BookDto> {
    ApiResponse::from_result(update(state, dto).await, STATUS_OK, state.environment)
}

/// Delete a book with its links and prices
pub async fn delete_book(state: &AppState, id: i64) -> ApiResponse<BookDto> {
    ApiResponse::from_result(delete(state, id).await, STATUS_OK, state.environment)
}

async fn list(state: &AppState) -> AppResult<Vec<BookDto>> {
    let books = state.books().await?.get_all().await?;
    Ok(books.into_iter().map(BookDto::from).collect())
}

async fn get(state: &AppState, id: i64) -> AppResult<BookDto> {
    state
        .books()
        .await?
        .get_by_id(id)
        .await?
        .map(BookDto::from)
        .ok_or_else(|| DomainError::not_found(EntityKind::Book, id).into())
}

async fn create(state: &AppState, dto: CreateBookDto) -> AppResult<BookDto> {
    let saved = state.books().await?.add(dto.into()).await?;
    Ok(saved.into())
}

async fn update(state: &AppState, dto: UpdateBookDto) -> AppResult<BookDto> {
    let saved = state.books().await?.update(dto.into()).await?;
    Ok(saved.into())
}

async fn delete(state: &AppState, id: i64) -> AppResult<BookDto> {
    let deleted = state.books().await?.delete(id).await?;
    Ok(deleted.into())
}
