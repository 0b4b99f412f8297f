// src/application/controllers/book_author_controller.rs

use super::{ApiResponse, STATUS_CREATED, STATUS_OK};
use crate::application::dto::{AuthorDto, BookAuthorDto, LinkBookAuthorDto};
use crate::application::state::AppState;
use crate::domain::{BookAuthorKey, DomainError, EntityKind};
use crate::error::AppResult;

/// First page of links, both sides loaded
pub async fn list_book_authors(state: &AppState) -> ApiResponse<Vec<BookAuthorDto>> {
    ApiResponse::from_result(list(state).await, STATUS_OK, state.environment)
}

pub async fn get_book_author(
    state: &AppState,
    book_id: i64,
    author_id: i64,
) -> ApiResponse<BookAuthorDto> {
    let key = BookAuthorKey::new(book_id, author_id);
    ApiResponse::from_result(get(state, key).await, STATUS_OK, state.environment)
}

pub async fn list_authors_of_book(state: &AppState, book_id: i64) -> ApiResponse<Vec<AuthorDto>> {
    ApiResponse::from_result(authors_of(state, book_id).await, STATUS_OK, state.environment)
}

pub async fn create_book_author(
    state: &AppState,
    dto: LinkBookAuthorDto,
) -> ApiResponse<BookAuthorDto> {
    ApiResponse::from_result(create(state, dto).await, STATUS_CREATED, state.environment)
}

pub async fn update_book_author(
    state: &AppState,
    dto: LinkBookAuthorDto,
) -> ApiResponse<BookAuthorDto> {
    ApiResponse::from_result(update(state, dto).await, STATUS_OK, state.environment)
}

pub async fn delete_book_author(
    state: &AppState,
    book_id: i64,
    author_id: i64,
) -> ApiResponse<BookAuthorDto> {
    let key = BookAuthorKey::new(book_id, author_id);
    ApiResponse::from_result(delete(state, key).await, STATUS_OK, state.environment)
}

async fn list(state: &AppState) -> AppResult<Vec<BookAuthorDto>> {
    let links = state.book_authors().await?.get_all().await?;
    Ok(links.into_iter().map(BookAuthorDto::from).collect())
}

async fn get(state: &AppState, key: BookAuthorKey) -> AppResult<BookAuthorDto> {
    state
        .book_authors()
        .await?
        .get_by_id(key)
        .await?
        .map(BookAuthorDto::from)
        .ok_or_else(|| DomainError::not_found(EntityKind::BookAuthor, key).into())
}

async fn authors_of(state: &AppState, book_id: i64) -> AppResult<Vec<AuthorDto>> {
    let authors = state.book_authors().await?.authors_of(book_id).await?;
    Ok(authors.into_iter().map(AuthorDto::from).collect())
}

async fn create(state: &AppState, dto: LinkBookAuthorDto) -> AppResult<BookAuthorDto> {
    let saved = state.book_authors().await?.add(dto.into()).await?;
    Ok(saved.into())
}

async fn update(state: &AppState, dto: LinkBookAuthorDto) -> AppResult<BookAuthorDto> {
    let saved = state.book_authors().await?.update(dto.into()).await?;
    Ok(saved.into())
}

async fn delete(state: &AppState, key: BookAuthorKey) -> AppResult<BookAuthorDto> {
    let deleted = state.book_authors().await?.delete(key).await?;
    Ok(deleted.into())
}
