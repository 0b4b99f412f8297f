// src/application/controllers/book_subject_controller.rs

use super::{ApiResponse, STATUS_CREATED, STATUS_OK};
use crate::application::dto::{BookSubjectDto, LinkBookSubjectDto, SubjectDto};
use crate::application::state::AppState;
use crate::domain::{BookSubjectKey, DomainError, EntityKind};
use crate::error::AppResult;

pub async fn list_book_subjects(state: &AppState) -> ApiResponse<Vec<BookSubjectDto>> {
    ApiResponse::from_result(list(state).await, STATUS_OK, state.environment)
}

pub async fn get_book_subject(
    state: &AppState,
    book_id: i64,
    subject_id: i64,
) -> ApiResponse<BookSubjectDto> {
    let key = BookSubjectKey::new(book_id, subject_id);
    ApiResponse::from_result(get(state, key).await, STATUS_OK, state.environment)
}

pub async fn list_subjects_of_book(
    state: &AppState,
    book_id: i64,
) -> ApiResponse<Vec<SubjectDto>> {
    ApiResponse::from_result(subjects_of(state, book_id).await, STATUS_OK, state.environment)
}

pub async fn create_book_subject(
    state: &AppState,
    dto: LinkBookSubjectDto,
) -> ApiResponse<BookSubjectDto> {
    ApiResponse::from_result(create(state, dto).await, STATUS_CREATED, state.environment)
}

pub async fn update_book_subject(
    state: &AppState,
    dto: LinkBookSubjectDto,
) -> ApiResponse<BookSubjectDto> {
    ApiResponse::from_result(update(state, dto).await, STATUS_OK, state.environment)
}

pub async fn delete_book_subject(
    state: &AppState,
    book_id: i64,
    subject_id: i64,
) -> ApiResponse<BookSubjectDto> {
    let key = BookSubjectKey::new(book_id, subject_id);
    ApiResponse::from_result(delete(state, key).await, STATUS_OK, state.environment)
}

async fn list(state: &AppState) -> AppResult<Vec<BookSubjectDto>> {
    let links = state.book_subjects().await?.get_all().await?;
    Ok(links.into_iter().map(BookSubjectDto::from).collect())
}

async fn get(state: &AppState, key: BookSubjectKey) -> AppResult<BookSubjectDto> {
    state
        .book_subjects()
        .await?
        .get_by_id(key)
        .await?
        .map(BookSubjectDto::from)
        .ok_or_else(|| DomainError::not_found(EntityKind::BookSubject, key).into())
}

async fn subjects_of(state: &AppState, book_id: i64) -> AppResult<Vec<SubjectDto>> {
    let subjects = state.book_subjects().await?.subjects_of(book_id).await?;
    Ok(subjects.into_iter().map(SubjectDto::from).collect())
}

async fn create(state: &AppState, dto: LinkBookSubjectDto) -> AppResult<BookSubjectDto> {
    let saved = state.book_subjects().await?.add(dto.into()).await?;
    Ok(saved.into())
}

async fn update(state: &AppState, dto: LinkBookSubjectDto) -> AppResult<BookSubjectDto> {
    let saved = state.book_subjects().await?.update(dto.into()).await?;
    Ok(saved.into())
}

async fn delete(state: &AppState, key: BookSubjectKey) -> AppResult<BookSubjectDto> {
    let deleted = state.book_subjects().await?.delete(key).await?;
    Ok(deleted.into())
}
